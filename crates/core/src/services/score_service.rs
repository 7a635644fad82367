use crate::models::fundamentals::{Fundamentals, Metric};
use crate::models::scores::{to_score, ScoreSet};
use crate::models::settings::{Band, ScoreSettings};

/// Clamp `value` into `[min, max]` and rescale it to `[0, 100]`.
///
/// With `invert` the result is `100 − scaled`. A missing or non-finite value,
/// or an empty band, scores 0.
pub fn normalize(value: Option<f64>, min: f64, max: f64, invert: bool) -> f64 {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    if min.is_nan() || max.is_nan() || max <= min {
        return 0.0;
    }
    let scaled = (value.clamp(min, max) - min) / (max - min) * 100.0;
    if invert {
        100.0 - scaled
    } else {
        scaled
    }
}

/// `normalize` inverted, for ratios where lower is better.
pub fn normalize_inverse(value: f64, low: f64, high: f64) -> f64 {
    normalize(Some(value), low, high, true)
}

fn score_in(value: Option<f64>, band: Band) -> f64 {
    normalize(value, band.low, band.high, false)
}

/// Scores one instrument from its fundamentals snapshot.
///
/// Financial-sector instruments are not valued on P/E: their value weight
/// moves to quality and dividend, and quality is measured by return on
/// equity instead of profit margin.
#[derive(Debug, Clone, Default)]
pub struct ScoreService {
    settings: ScoreSettings,
}

impl ScoreService {
    pub fn new(settings: ScoreSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ScoreSettings {
        &self.settings
    }

    pub fn is_financial(&self, fundamentals: &Fundamentals) -> bool {
        fundamentals.is_sector(&self.settings.financial_sector)
    }

    pub fn score(&self, fundamentals: &Fundamentals) -> ScoreSet {
        let s = &self.settings;
        let financial = self.is_financial(fundamentals);

        let value = if financial {
            0.0
        } else {
            let pe = fundamentals.metric(Metric::TrailingPe);
            normalize(pe, s.pe_band.low, s.pe_band.high, true)
        };
        let quality = if financial {
            score_in(fundamentals.metric(Metric::ReturnOnEquity), s.roe_band)
        } else {
            score_in(fundamentals.metric(Metric::ProfitMargins), s.margin_band)
        };
        let growth = score_in(fundamentals.earnings_growth(), s.growth_band);
        let dividend = score_in(fundamentals.metric(Metric::DividendYield), s.dividend_band);

        let mut weights = s.weights;
        let mut total_weight = weights.total();
        if financial {
            total_weight -= weights.value;
            weights.quality += s.financial_quality_bonus;
            weights.dividend += s.financial_dividend_bonus;
            weights.value = 0.0;
        }

        let weighted = value * weights.value
            + quality * weights.quality
            + growth * weights.growth
            + dividend * weights.dividend;
        let global = if total_weight > 0.0 { weighted / total_weight } else { 0.0 };

        tracing::debug!(
            symbol = %fundamentals.symbol,
            financial,
            "Scored value={value:.1} quality={quality:.1} growth={growth:.1} dividend={dividend:.1} global={global:.1}"
        );

        ScoreSet {
            global_score: to_score(global),
            value_score: to_score(value),
            quality_score: to_score(quality),
            growth_score: to_score(growth),
            dividend_score: to_score(dividend),
        }
    }
}
