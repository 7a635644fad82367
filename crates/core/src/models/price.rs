use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A single daily close (date → price).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Daily closes for every symbol of one computation.
///
/// Built once per evaluation window and only read afterwards. A symbol whose
/// fetch failed is present with an empty series, so every lookup for it
/// resolves to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    entries: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the closes of a symbol. Non-finite and non-positive closes are dropped
    /// so they read as "no price" instead of a zero valuation.
    pub fn insert_series(&mut self, symbol: &str, points: &[PricePoint]) {
        let series = self.entries.entry(symbol.to_uppercase()).or_default();
        for point in points {
            if point.price.is_finite() && point.price > 0.0 {
                series.insert(point.date, point.price);
            }
        }
    }

    /// Register a symbol with no history (failed or empty fetch).
    pub fn insert_empty(&mut self, symbol: &str) {
        self.entries.entry(symbol.to_uppercase()).or_default();
    }

    /// Exact-date close.
    pub fn get(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        self.entries.get(&symbol.to_uppercase())?.get(&date).copied()
    }

    /// Close on `date`, or on the closest earlier date no more than
    /// `lookback_days` calendar days back.
    ///
    /// Bounded so a long provider hole never stitches in a stale price.
    pub fn resolve(&self, symbol: &str, date: NaiveDate, lookback_days: u32) -> Option<f64> {
        let series = self.entries.get(&symbol.to_uppercase())?;
        let earliest = date - Duration::days(i64::from(lookback_days));
        series
            .range(earliest..=date)
            .next_back()
            .map(|(_, price)| *price)
    }

    /// Multiply every close of a symbol by `factor` (currency conversion).
    pub fn scale(&mut self, symbol: &str, factor: f64) {
        if let Some(series) = self.entries.get_mut(&symbol.to_uppercase()) {
            for price in series.values_mut() {
                *price *= factor;
            }
        }
    }

    /// Drop every close of a symbol, keeping it registered.
    pub fn clear_symbol(&mut self, symbol: &str) {
        if let Some(series) = self.entries.get_mut(&symbol.to_uppercase()) {
            series.clear();
        }
    }

    pub fn has_history(&self, symbol: &str) -> bool {
        self.entries
            .get(&symbol.to_uppercase())
            .is_some_and(|series| !series.is_empty())
    }

    /// Total number of stored closes across all symbols.
    pub fn total_entries(&self) -> usize {
        self.entries.values().map(|series| series.len()).sum()
    }
}
