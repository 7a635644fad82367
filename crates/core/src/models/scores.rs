use serde::{Deserialize, Serialize};

/// Composite and per-factor scores of one instrument, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreSet {
    pub global_score: u8,
    pub value_score: u8,
    pub quality_score: u8,
    pub growth_score: u8,
    pub dividend_score: u8,
}

/// Top-level portfolio score and its three components, each 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthScore {
    pub final_score: u8,
    pub diversification_score: u8,
    pub quality_score: u8,
    pub performance_score: u8,
}

impl HealthScore {
    /// All-zero score returned for an empty or worthless portfolio.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Round a 0–100 float score to its integer display value.
pub(crate) fn to_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
