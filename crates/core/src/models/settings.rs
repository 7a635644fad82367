use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::performance::RangeCode;

/// What the engine does with a price quoted in a currency it has no rate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingRatePolicy {
    /// Treat the price as unknown.
    #[default]
    Exclude,
    /// Use the price unconverted (rate of 1).
    AssumeParity,
}

/// A `[low, high]` normalization band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn validate(&self, name: &str) -> Result<(), CoreError> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(CoreError::ValidationError(format!(
                "Band '{name}' must satisfy low < high (got [{}, {}])",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Weights of the four instrument factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub value: f64,
    pub quality: f64,
    pub growth: f64,
    pub dividend: f64,
}

impl FactorWeights {
    pub fn total(&self) -> f64 {
        self.value + self.quality + self.growth + self.dividend
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            value: 0.25,
            quality: 0.35,
            growth: 0.25,
            dividend: 0.15,
        }
    }
}

/// Investment score model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreSettings {
    pub weights: FactorWeights,

    /// Sector label that switches an instrument to the financial weighting
    pub financial_sector: String,

    /// Added to the quality weight of financial instruments
    pub financial_quality_bonus: f64,

    /// Added to the dividend weight of financial instruments
    pub financial_dividend_bonus: f64,

    /// Trailing P/E band, scored inverted (cheaper is better)
    pub pe_band: Band,

    pub roe_band: Band,
    pub margin_band: Band,
    pub growth_band: Band,
    pub dividend_band: Band,
}

impl Default for ScoreSettings {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            financial_sector: "Financial Services".to_string(),
            financial_quality_bonus: 0.15,
            financial_dividend_bonus: 0.10,
            pe_band: Band::new(5.0, 40.0),
            roe_band: Band::new(0.0, 0.20),
            margin_band: Band::new(0.0, 0.25),
            growth_band: Band::new(0.0, 0.30),
            dividend_band: Band::new(0.0, 0.06),
        }
    }
}

/// Portfolio health scorer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Largest instrument-type share, in percent
    pub type_band: Band,
    /// Largest single-instrument share, in percent
    pub instrument_band: Band,
    /// Largest sector share, in percent
    pub sector_band: Band,

    pub type_weight: f64,
    pub instrument_weight: f64,
    pub sector_weight: f64,

    pub diversification_weight: f64,
    pub quality_weight: f64,
    pub performance_weight: f64,

    /// Quality score used when no equity could be scored
    pub neutral_quality: f64,

    /// Fewer daily returns than this leave the performance score at 0
    pub min_daily_returns: usize,

    pub trading_days_per_year: f64,
    pub risk_free_rate: f64,

    /// Sharpe ratio mapped to a score of 100
    pub target_sharpe: f64,

    /// Window of the daily returns used for the Sharpe ratio
    pub performance_range: RangeCode,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            type_band: Band::new(50.0, 100.0),
            instrument_band: Band::new(5.0, 30.0),
            sector_band: Band::new(30.0, 60.0),
            type_weight: 0.3,
            instrument_weight: 0.4,
            sector_weight: 0.3,
            diversification_weight: 0.5,
            quality_weight: 0.3,
            performance_weight: 0.2,
            neutral_quality: 50.0,
            min_daily_returns: 21,
            trading_days_per_year: 252.0,
            risk_free_rate: 0.02,
            target_sharpe: 1.5,
            performance_range: RangeCode::OneYear,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The currency every value is reported in (e.g., "EUR", "USD").
    pub reporting_currency: String,

    /// Calendar days a missing close may be filled from an earlier close
    pub price_lookback_days: u32,

    pub missing_rate_policy: MissingRatePolicy,

    pub score: ScoreSettings,

    pub health: HealthSettings,

    /// Log level for `init_logger` (TRACE, DEBUG, INFO, WARN, ERROR)
    pub verbosity: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reporting_currency: "EUR".to_string(),
            price_lookback_days: 7,
            missing_rate_policy: MissingRatePolicy::default(),
            score: ScoreSettings::default(),
            health: HealthSettings::default(),
            verbosity: "INFO".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.reporting_currency = settings.reporting_currency.trim().to_uppercase();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let currency = &self.reporting_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::ValidationError(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters (e.g., EUR, USD)"
            )));
        }
        if self.price_lookback_days == 0 {
            return Err(CoreError::ValidationError(
                "price_lookback_days must be at least 1".into(),
            ));
        }

        let score = &self.score;
        score.pe_band.validate("pe_band")?;
        score.roe_band.validate("roe_band")?;
        score.margin_band.validate("margin_band")?;
        score.growth_band.validate("growth_band")?;
        score.dividend_band.validate("dividend_band")?;
        let weights = [
            score.weights.value,
            score.weights.quality,
            score.weights.growth,
            score.weights.dividend,
            score.financial_quality_bonus,
            score.financial_dividend_bonus,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::ValidationError(
                "Score weights must be finite and non-negative".into(),
            ));
        }
        if score.weights.total() - score.weights.value <= 0.0 {
            return Err(CoreError::ValidationError(
                "Score weights other than value must not all be zero".into(),
            ));
        }

        let health = &self.health;
        health.type_band.validate("type_band")?;
        health.instrument_band.validate("instrument_band")?;
        health.sector_band.validate("sector_band")?;
        if !health.target_sharpe.is_finite() || health.target_sharpe <= 0.0 {
            return Err(CoreError::ValidationError(
                "target_sharpe must be positive".into(),
            ));
        }
        if !health.trading_days_per_year.is_finite() || health.trading_days_per_year <= 0.0 {
            return Err(CoreError::ValidationError(
                "trading_days_per_year must be positive".into(),
            ));
        }
        Ok(())
    }
}
