use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use crate::models::position::Position;
use crate::models::scores::{to_score, HealthScore, ScoreSet};
use crate::models::settings::HealthSettings;
use crate::services::score_service::normalize_inverse;

/// A position with its current value in the reporting currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuedPosition {
    pub position: Position,
    pub value: f64,
}

impl ValuedPosition {
    /// Value at `price` when one is known, else what was paid for it.
    pub fn new(position: Position, price: Option<f64>) -> Self {
        let value = match price.filter(|p| p.is_finite()) {
            Some(price) => price * position.total_quantity,
            None => position.total_cost,
        };
        Self { position, value }
    }
}

/// Largest group value over `total`, 0 when nothing is grouped.
fn largest_share<K: Eq + Hash>(groups: impl IntoIterator<Item = (K, f64)>, total: f64) -> f64 {
    let mut sums: HashMap<K, f64> = HashMap::new();
    for (key, value) in groups {
        *sums.entry(key).or_insert(0.0) += value;
    }
    sums.into_values().fold(0.0, f64::max) / total
}

/// Combines diversification, instrument quality and risk-adjusted
/// performance into the top-level portfolio score.
#[derive(Debug, Clone, Default)]
pub struct HealthService {
    settings: HealthSettings,
}

impl HealthService {
    pub fn new(settings: HealthSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &HealthSettings {
        &self.settings
    }

    fn total_value(positions: &[ValuedPosition]) -> f64 {
        positions.iter().map(|p| p.value).sum()
    }

    /// Concentration penalty over instrument type, single instrument and
    /// sector. Positions without a sector count toward the total only.
    pub fn diversification_score(&self, positions: &[ValuedPosition]) -> f64 {
        let total = Self::total_value(positions);
        if !(total.is_finite() && total > 0.0) {
            return 0.0;
        }
        let s = &self.settings;

        let type_share = largest_share(
            positions.iter().map(|p| (p.position.instrument_type, p.value)),
            total,
        );
        let instrument_share = largest_share(
            positions.iter().map(|p| (p.position.symbol.as_str(), p.value)),
            total,
        );
        let sector_share = largest_share(
            positions
                .iter()
                .filter_map(|p| p.position.sector.as_deref().map(|sector| (sector, p.value))),
            total,
        );

        let type_score = normalize_inverse(type_share * 100.0, s.type_band.low, s.type_band.high);
        let instrument_score = normalize_inverse(
            instrument_share * 100.0,
            s.instrument_band.low,
            s.instrument_band.high,
        );
        let sector_score =
            normalize_inverse(sector_share * 100.0, s.sector_band.low, s.sector_band.high);

        type_score * s.type_weight + instrument_score * s.instrument_weight + sector_score * s.sector_weight
    }

    /// Value-weighted average global score of the scored equities.
    pub fn quality_score(&self, positions: &[ValuedPosition], scores: &HashMap<String, ScoreSet>) -> f64 {
        let total = Self::total_value(positions);
        if !(total.is_finite() && total > 0.0) {
            return self.settings.neutral_quality;
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for p in positions.iter().filter(|p| p.position.instrument_type.is_equity()) {
            if let Some(score) = scores.get(&p.position.symbol) {
                let weight = p.value / total;
                weighted_sum += f64::from(score.global_score) * weight;
                total_weight += weight;
            }
        }

        if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            self.settings.neutral_quality
        }
    }

    /// Sharpe ratio of the daily returns, mapped so the target ratio scores 100.
    pub fn performance_score(&self, daily_returns: &[f64]) -> f64 {
        let s = &self.settings;
        if daily_returns.len() < s.min_daily_returns || daily_returns.is_empty() {
            return 0.0;
        }

        let n = daily_returns.len() as f64;
        let mean = daily_returns.iter().sum::<f64>() / n;
        let variance = daily_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        // A constant series leaves only rounding noise in the deviation
        if !(std_dev.is_finite() && std_dev > f64::EPSILON) {
            return 0.0;
        }

        let annualized_return = (1.0 + mean).powf(s.trading_days_per_year) - 1.0;
        let annualized_std_dev = std_dev * s.trading_days_per_year.sqrt();
        let sharpe = (annualized_return - s.risk_free_rate) / annualized_std_dev;
        let score = sharpe / s.target_sharpe * 100.0;
        if score.is_finite() {
            score.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Final score over a valued snapshot. An empty or worthless portfolio
    /// scores zero everywhere.
    pub fn compute(
        &self,
        positions: &[ValuedPosition],
        scores: &HashMap<String, ScoreSet>,
        daily_returns: &[f64],
    ) -> HealthScore {
        let total = Self::total_value(positions);
        if positions.is_empty() || !(total.is_finite() && total > 0.0) {
            return HealthScore::zero();
        }
        let s = &self.settings;

        let diversification = self.diversification_score(positions);
        let quality = self.quality_score(positions, scores);
        let performance = self.performance_score(daily_returns);
        let final_score = diversification * s.diversification_weight
            + quality * s.quality_weight
            + performance * s.performance_weight;

        tracing::debug!(
            "Health: diversification={diversification:.1} quality={quality:.1} performance={performance:.1} ({} returns)",
            daily_returns.len()
        );

        HealthScore {
            final_score: to_score(final_score),
            diversification_score: to_score(diversification),
            quality_score: to_score(quality),
            performance_score: to_score(performance),
        }
    }
}
