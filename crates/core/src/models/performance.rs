use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One day of the portfolio performance series.
///
/// Only emitted for days with a resolvable, non-zero market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,

    /// market_value − cost_basis
    pub profit_and_loss: f64,

    /// (twr_factor − 1) × 100 as of this day
    pub cumulative_return_pct: f64,

    /// Σ quantity × resolved price over positions priced on this day
    pub market_value: f64,

    /// Σ total_cost over every position held on this day, priced or not
    pub cost_basis: f64,
}

/// Output of the valuation walk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub points: Vec<PerformancePoint>,

    /// Chained sub-period returns, in date order, one per return-bearing day.
    pub daily_returns: Vec<f64>,
}

impl PerformanceReport {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Cumulative return of the last point, if any.
    pub fn final_return_pct(&self) -> Option<f64> {
        self.points.last().map(|p| p.cumulative_return_pct)
    }
}

/// Look-back window of a performance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RangeCode {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl RangeCode {
    pub const ALL: [RangeCode; 8] = [
        RangeCode::OneDay,
        RangeCode::FiveDays,
        RangeCode::OneMonth,
        RangeCode::SixMonths,
        RangeCode::YearToDate,
        RangeCode::OneYear,
        RangeCode::FiveYears,
        RangeCode::Max,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            RangeCode::OneDay => "1d",
            RangeCode::FiveDays => "5d",
            RangeCode::OneMonth => "1mo",
            RangeCode::SixMonths => "6mo",
            RangeCode::YearToDate => "ytd",
            RangeCode::OneYear => "1y",
            RangeCode::FiveYears => "5y",
            RangeCode::Max => "max",
        }
    }

    /// Parse a range code, falling back to one year for anything unknown.
    pub fn parse_lenient(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    /// First day of the window ending on `today`.
    ///
    /// Month arithmetic clamps to the last day of shorter months
    /// (Mar 31 − 1mo = Feb 28/29).
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
        match self {
            RangeCode::OneDay => today - Duration::days(1),
            RangeCode::FiveDays => today - Duration::days(5),
            RangeCode::OneMonth => today.checked_sub_months(Months::new(1)).unwrap_or(epoch),
            RangeCode::SixMonths => today.checked_sub_months(Months::new(6)).unwrap_or(epoch),
            RangeCode::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(epoch),
            RangeCode::OneYear => today.checked_sub_months(Months::new(12)).unwrap_or(epoch),
            RangeCode::FiveYears => today.checked_sub_months(Months::new(60)).unwrap_or(epoch),
            RangeCode::Max => epoch,
        }
    }
}

impl std::fmt::Display for RangeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for RangeCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        RangeCode::ALL
            .iter()
            .find(|r| r.code() == wanted)
            .copied()
            .ok_or_else(|| CoreError::InvalidRange(s.to_string()))
    }
}
