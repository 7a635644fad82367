use chrono::NaiveDate;
use futures::future::join_all;

use crate::models::fundamentals::Fundamentals;
use crate::models::scores::ScoreSet;
use crate::models::screener::{ScreenerFilters, ScreenerHit, SCREENER_MAX_RESULTS};
use crate::services::price_service::PriceService;
use crate::services::score_service::ScoreService;

/// Screens candidate symbols on fundamentals, scores and price performance.
pub struct ScreenerService {
    score_service: ScoreService,
}

impl ScreenerService {
    pub fn new(score_service: ScoreService) -> Self {
        Self { score_service }
    }

    /// Whether a scored instrument passes the fundamental and score criteria.
    pub fn passes(&self, fundamentals: &Fundamentals, scores: &ScoreSet, filters: &ScreenerFilters) -> bool {
        if let Some(sector) = filters.sector.as_deref().filter(|s| !s.is_empty()) {
            if !fundamentals.is_sector(sector) {
                return false;
            }
        }

        if let Some(min) = filters.dividend_yield_min.filter(|m| *m > 0.0) {
            match fundamentals.summary_detail.dividend_yield {
                Some(dividend_yield) if dividend_yield * 100.0 >= min => {}
                _ => return false,
            }
        }

        if let Some(min) = filters.analyst_buy_min.filter(|m| *m > 0.0) {
            let buy_percent = fundamentals
                .recommendation
                .as_ref()
                .and_then(|r| r.buy_percent());
            match buy_percent {
                Some(percent) if percent >= min => {}
                _ => return false,
            }
        }

        let score_checks = [
            (filters.global_score_min, scores.global_score),
            (filters.value_score_min, scores.value_score),
            (filters.quality_score_min, scores.quality_score),
        ];
        score_checks
            .iter()
            .all(|(min, score)| min.map_or(true, |min| *score >= min))
    }

    /// Run a screen over `candidates`.
    ///
    /// Fundamentals are fetched concurrently; a candidate whose fetch fails
    /// is dropped. Performance bounds, when set, need a simple return over
    /// `filters.performance_range`; a candidate without one is dropped too.
    /// At most 50 hits are returned, in candidate order.
    pub async fn screen(
        &self,
        price_service: &PriceService,
        candidates: &[String],
        filters: &ScreenerFilters,
        today: NaiveDate,
    ) -> Vec<ScreenerHit> {
        let fetches = candidates
            .iter()
            .map(|symbol| async move { price_service.fetch_fundamentals(symbol).await });
        let fetched = join_all(fetches).await;

        let base: Vec<ScreenerHit> = fetched
            .into_iter()
            .flatten()
            .filter_map(|fundamentals| {
                let scores = self.score_service.score(&fundamentals);
                self.passes(&fundamentals, &scores, filters).then(|| ScreenerHit {
                    symbol: fundamentals.symbol.clone(),
                    scores,
                    fundamentals,
                    performance_pct: None,
                })
            })
            .collect();

        tracing::debug!("{} of {} candidates passed the base screen", base.len(), candidates.len());

        if !filters.filters_performance() {
            return base.into_iter().take(SCREENER_MAX_RESULTS).collect();
        }

        let range = filters.performance_range;
        let with_performance = base.into_iter().map(|hit| async move {
            let performance = price_service.simple_return(&hit.symbol, range, today).await?;
            let above_min = filters.performance_min.map_or(true, |min| performance >= min);
            let below_max = filters.performance_max.map_or(true, |max| performance <= max);
            (above_min && below_max).then_some(ScreenerHit {
                performance_pct: Some(performance),
                ..hit
            })
        });

        join_all(with_performance)
            .await
            .into_iter()
            .flatten()
            .take(SCREENER_MAX_RESULTS)
            .collect()
    }
}
