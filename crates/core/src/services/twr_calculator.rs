use serde::{Deserialize, Serialize};

/// Chains daily sub-period returns into a time-weighted return.
///
/// Only days where held positions were priced at both ends contribute, so
/// buying more (a cash inflow) never shows up as performance. The chain is
/// order-dependent: feed days in increasing date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwrCalculator {
    factor: f64,
    daily_returns: Vec<f64>,
}

impl Default for TwrCalculator {
    fn default() -> Self {
        Self {
            factor: 1.0,
            daily_returns: Vec::new(),
        }
    }
}

impl TwrCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one day from its start-of-day and end-of-day values.
    ///
    /// Returns the day's return, or `None` (and leaves the chain untouched)
    /// when `start_of_day_value` is not positive.
    pub fn record_day(&mut self, start_of_day_value: f64, end_of_day_value: f64) -> Option<f64> {
        if start_of_day_value.is_nan() || start_of_day_value <= 0.0 || !end_of_day_value.is_finite() {
            return None;
        }
        let daily_return = (end_of_day_value - start_of_day_value) / start_of_day_value;
        self.push_return(daily_return);
        Some(daily_return)
    }

    fn push_return(&mut self, daily_return: f64) {
        self.factor *= 1.0 + daily_return;
        self.daily_returns.push(daily_return);
    }

    /// Π (1 + rᵢ) so far.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// (factor − 1) × 100
    pub fn cumulative_return_pct(&self) -> f64 {
        (self.factor - 1.0) * 100.0
    }

    pub fn daily_returns(&self) -> &[f64] {
        &self.daily_returns
    }

    pub fn into_daily_returns(self) -> Vec<f64> {
        self.daily_returns
    }
}
