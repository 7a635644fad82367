use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::analytics::{HoldingSummary, PortfolioSummary};
use crate::models::quote::ConvertedQuote;
use crate::models::transaction::Transaction;
use crate::services::portfolio_service::PortfolioService;

/// Builds per-symbol holding summaries: average price, live value, P&L and
/// allocation.
///
/// Quotes are fetched and converted by the caller; this service never calls
/// a provider.
pub struct AnalyticsService {
    portfolio_service: PortfolioService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            portfolio_service: PortfolioService::new(),
        }
    }

    /// Summarize every holding as of `as_of_date`.
    ///
    /// A holding without a quote in `quotes` keeps its cost figures but has
    /// no current price, value, P&L or allocation.
    pub fn summarize_holdings(
        &self,
        transactions: &[Transaction],
        quotes: &HashMap<String, ConvertedQuote>,
        as_of_date: NaiveDate,
        currency: &str,
    ) -> PortfolioSummary {
        let positions = self.portfolio_service.positions_as_of(transactions, as_of_date);

        // 1. Per-symbol cost figures and live value
        let mut holdings: Vec<HoldingSummary> = positions
            .into_iter()
            .map(|position| {
                let quote = quotes.get(&position.symbol);
                let current_price = quote.map(|q| q.price).filter(|p| p.is_finite());
                let average_price = position.average_price();

                let mut buys: Vec<Transaction> = transactions
                    .iter()
                    .filter(|tx| tx.symbol == position.symbol && tx.purchase_date <= as_of_date)
                    .cloned()
                    .collect();
                buys.sort_by_key(|tx| tx.purchase_date);

                HoldingSummary {
                    long_name: position.long_name.clone(),
                    instrument_type: position.instrument_type,
                    sector: position.sector.clone(),
                    country: position.country.clone(),
                    quantity: position.total_quantity,
                    total_cost: position.total_cost,
                    average_price,
                    current_price,
                    daily_change_pct: quote.and_then(|q| q.change_pct),
                    pl_amount: current_price.map(|p| (p - average_price) * position.total_quantity),
                    total_value: current_price.map(|p| p * position.total_quantity),
                    allocation_pct: None,
                    transactions: buys,
                    symbol: position.symbol,
                }
            })
            .collect();

        // 2. Totals
        let total_value: f64 = holdings.iter().filter_map(|h| h.total_value).sum();
        let total_invested: f64 = holdings.iter().map(|h| h.total_cost).sum();
        let total_gain_loss: f64 = holdings.iter().filter_map(|h| h.pl_amount).sum();

        // 3. Allocation of each priced holding
        if total_value > 0.0 {
            for holding in &mut holdings {
                holding.allocation_pct = holding.total_value.map(|v| v / total_value * 100.0);
            }
        }

        PortfolioSummary {
            as_of_date,
            currency: currency.to_string(),
            total_value,
            total_invested,
            total_gain_loss,
            holdings,
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
