use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::performance::{PerformancePoint, PerformanceReport};
use crate::models::position::Position;
use crate::models::price::PriceSeries;
use crate::models::transaction::Transaction;
use crate::services::portfolio_service::PortfolioService;
use crate::services::twr_calculator::TwrCalculator;

/// Valuation of the portfolio on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyValuation {
    pub date: NaiveDate,

    /// Σ total_cost of every held position
    pub cost_basis: f64,

    /// Σ quantity × today's price over positions priced today
    pub market_value: f64,

    /// Σ quantity × yesterday's price over positions priced on both days
    pub start_of_day_value: f64,

    /// Σ quantity × today's price over positions priced on both days
    pub end_of_day_value: f64,
}

/// Rebuilds the daily value and time-weighted performance of a portfolio.
///
/// For each calendar day from `max(range_start, first purchase)` to `today`:
/// 1. Apply the transactions dated that day (incremental, O(days + transactions))
/// 2. Resolve today's and yesterday's close per position, each with the
///    bounded backward lookback
/// 3. Chain the day's return when at least one position was priced on both days
/// 4. Emit a point when the day has a non-zero market value
///
/// Days without any resolvable price produce nothing; they are not zero-filled.
pub struct ValuationService {
    lookback_days: u32,
}

impl ValuationService {
    pub fn new(lookback_days: u32) -> Self {
        Self { lookback_days }
    }

    /// First day of the walk, `None` without transactions.
    pub fn walk_start(&self, transactions: &[Transaction], range_start: NaiveDate) -> Option<NaiveDate> {
        PortfolioService::new()
            .earliest_purchase_date(transactions)
            .map(|earliest| earliest.max(range_start))
    }

    /// First day of price history needed to walk from `walk_start`.
    ///
    /// The day before the walk resolves its own close with the full
    /// lookback, so history starts `lookback + 1` days back.
    pub fn fetch_start(&self, walk_start: NaiveDate) -> NaiveDate {
        walk_start - Duration::days(i64::from(self.lookback_days) + 1)
    }

    /// Value `positions` on `date`.
    pub fn value_day<'a>(
        &self,
        positions: impl IntoIterator<Item = &'a Position>,
        series: &PriceSeries,
        date: NaiveDate,
    ) -> DailyValuation {
        let mut valuation = DailyValuation {
            date,
            cost_basis: 0.0,
            market_value: 0.0,
            start_of_day_value: 0.0,
            end_of_day_value: 0.0,
        };
        let yesterday = date.pred_opt();

        for position in positions {
            valuation.cost_basis += position.total_cost;

            let Some(todays_price) = series.resolve(&position.symbol, date, self.lookback_days) else {
                continue;
            };
            valuation.market_value += position.total_quantity * todays_price;

            let yesterdays_price =
                yesterday.and_then(|d| series.resolve(&position.symbol, d, self.lookback_days));
            if let Some(yesterdays_price) = yesterdays_price {
                valuation.start_of_day_value += position.total_quantity * yesterdays_price;
                valuation.end_of_day_value += position.total_quantity * todays_price;
            }
        }
        valuation
    }

    /// Walk the calendar and build the performance series.
    pub fn compute(
        &self,
        transactions: &[Transaction],
        series: &PriceSeries,
        range_start: NaiveDate,
        today: NaiveDate,
    ) -> PerformanceReport {
        let Some(start) = self.walk_start(transactions, range_start) else {
            return PerformanceReport::default();
        };

        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by_key(|tx| tx.purchase_date);

        let mut positions: BTreeMap<String, Position> = BTreeMap::new();
        let mut next_tx = 0;
        let mut twr = TwrCalculator::new();
        let mut points = Vec::new();
        let mut current_date = start;

        while current_date <= today {
            while next_tx < sorted.len() && sorted[next_tx].purchase_date <= current_date {
                PortfolioService::apply(&mut positions, sorted[next_tx]);
                next_tx += 1;
            }

            let day = self.value_day(positions.values(), series, current_date);
            twr.record_day(day.start_of_day_value, day.end_of_day_value);

            if day.market_value > 0.0 {
                points.push(PerformancePoint {
                    date: current_date,
                    profit_and_loss: day.market_value - day.cost_basis,
                    cumulative_return_pct: twr.cumulative_return_pct(),
                    market_value: day.market_value,
                    cost_basis: day.cost_basis,
                });
            }

            current_date = match current_date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        tracing::debug!(
            "Valued {} days from {start} to {today}: {} points, {} return days",
            (today - start).num_days() + 1,
            points.len(),
            twr.daily_returns().len()
        );

        PerformanceReport {
            points,
            daily_returns: twr.into_daily_returns(),
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new(7)
    }
}
