use serde::{Deserialize, Serialize};

use super::fundamentals::Fundamentals;
use super::performance::RangeCode;
use super::scores::ScoreSet;

/// Maximum rows returned by one screen.
pub const SCREENER_MAX_RESULTS: usize = 50;

/// Criteria of a fundamentals screen. Unset criteria do not filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerFilters {
    pub sector: Option<String>,

    /// Minimum dividend yield, in percent
    pub dividend_yield_min: Option<f64>,

    /// Minimum share of (strong) buy analyst calls, in percent
    pub analyst_buy_min: Option<f64>,

    pub global_score_min: Option<u8>,
    pub value_score_min: Option<u8>,
    pub quality_score_min: Option<u8>,

    /// Price performance bounds over `performance_range`, in percent
    pub performance_min: Option<f64>,
    pub performance_max: Option<f64>,
    pub performance_range: RangeCode,
}

impl Default for ScreenerFilters {
    /// No criteria. Performance bounds, once set, apply year to date.
    fn default() -> Self {
        Self {
            sector: None,
            dividend_yield_min: None,
            analyst_buy_min: None,
            global_score_min: None,
            value_score_min: None,
            quality_score_min: None,
            performance_min: None,
            performance_max: None,
            performance_range: RangeCode::YearToDate,
        }
    }
}

impl ScreenerFilters {
    pub fn filters_performance(&self) -> bool {
        self.performance_min.is_some() || self.performance_max.is_some()
    }
}

/// One instrument that passed a screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerHit {
    pub symbol: String,
    pub scores: ScoreSet,
    pub fundamentals: Fundamentals,
    /// Set only when the screen filtered on performance
    pub performance_pct: Option<f64>,
}
