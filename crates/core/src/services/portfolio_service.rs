use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::position::Position;
use crate::models::transaction::Transaction;

/// Aggregates buy transactions into positions.
///
/// Pure business logic. No I/O, no API calls.
pub struct PortfolioService;

impl PortfolioService {
    pub fn new() -> Self {
        Self
    }

    /// Positions built from every transaction dated on or before `cutoff`,
    /// ordered by symbol.
    pub fn positions_as_of(&self, transactions: &[Transaction], cutoff: NaiveDate) -> Vec<Position> {
        let mut positions: BTreeMap<String, Position> = BTreeMap::new();
        for tx in transactions.iter().filter(|tx| tx.purchase_date <= cutoff) {
            Self::apply(&mut positions, tx);
        }
        positions.into_values().collect()
    }

    /// Add one transaction to a symbol-keyed position map.
    pub(crate) fn apply(positions: &mut BTreeMap<String, Position>, tx: &Transaction) {
        let position = positions.entry(tx.symbol.clone()).or_insert_with(|| Position {
            symbol: tx.symbol.clone(),
            total_quantity: 0.0,
            total_cost: 0.0,
            instrument_type: tx.instrument_type,
            sector: tx.sector.clone(),
            country: tx.country.clone(),
            long_name: tx.long_name.clone(),
        });
        position.total_quantity += tx.quantity;
        position.total_cost += tx.cost();
        if position.sector.is_none() {
            position.sector = tx.sector.clone();
        }
        if position.country.is_none() {
            position.country = tx.country.clone();
        }
        if position.long_name.is_none() {
            position.long_name = tx.long_name.clone();
        }
    }

    /// Distinct symbols, sorted.
    pub fn symbols(&self, transactions: &[Transaction]) -> Vec<String> {
        let mut symbols: Vec<String> = transactions.iter().map(|tx| tx.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();
        symbols
    }

    pub fn earliest_purchase_date(&self, transactions: &[Transaction]) -> Option<NaiveDate> {
        transactions.iter().map(|tx| tx.purchase_date).min()
    }

    /// Transactions of instruments that have a daily market series.
    pub fn market_traded(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| tx.instrument_type.has_market_history())
            .cloned()
            .collect()
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}
