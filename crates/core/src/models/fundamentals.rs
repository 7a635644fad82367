use serde::{Deserialize, Serialize};

/// Provider module a fundamental value can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundamentalSource {
    SummaryDetail,
    DefaultKeyStatistics,
    FinancialData,
}

/// A fundamental metric the score model reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    TrailingPe,
    ReturnOnEquity,
    ProfitMargins,
    DividendYield,
}

impl Metric {
    /// Sources tried in order; the first finite value wins.
    pub fn sources(&self) -> &'static [FundamentalSource] {
        match self {
            Metric::TrailingPe => &[FundamentalSource::SummaryDetail],
            Metric::ReturnOnEquity => &[
                FundamentalSource::FinancialData,
                FundamentalSource::DefaultKeyStatistics,
            ],
            Metric::ProfitMargins => &[
                FundamentalSource::FinancialData,
                FundamentalSource::DefaultKeyStatistics,
            ],
            Metric::DividendYield => &[
                FundamentalSource::SummaryDetail,
                FundamentalSource::DefaultKeyStatistics,
            ],
        }
    }
}

/// `summaryDetail` module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryDetail {
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub market_cap: Option<f64>,
}

/// `defaultKeyStatistics` module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStatistics {
    pub return_on_equity: Option<f64>,
    pub profit_margins: Option<f64>,
    /// Fund distribution yield, used when `dividendYield` is absent.
    #[serde(rename = "yield")]
    pub yield_: Option<f64>,
}

/// `financialData` module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    pub return_on_equity: Option<f64>,
    pub profit_margins: Option<f64>,
}

/// One row of the `earningsTrend` module (`0q`, `+1q`, `0y`, `+1y`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsTrendEntry {
    pub period: String,
    pub growth: Option<f64>,
}

/// Analyst recommendation counts for the latest period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTrend {
    pub strong_buy: Option<u32>,
    pub buy: Option<u32>,
    pub hold: Option<u32>,
    pub sell: Option<u32>,
    pub strong_sell: Option<u32>,
}

impl RecommendationTrend {
    /// Share of (strong) buy calls in percent.
    ///
    /// `None` unless all five counts are present and at least one call exists.
    pub fn buy_percent(&self) -> Option<f64> {
        let strong_buy = self.strong_buy?;
        let buy = self.buy?;
        let total = strong_buy + buy + self.hold? + self.sell? + self.strong_sell?;
        if total == 0 {
            return None;
        }
        Some(f64::from(strong_buy + buy) / f64::from(total) * 100.0)
    }
}

/// Fundamentals snapshot of one instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub sector: Option<String>,
    pub summary_detail: SummaryDetail,
    pub key_statistics: KeyStatistics,
    pub financial_data: FinancialData,
    pub earnings_trend: Vec<EarningsTrendEntry>,
    pub recommendation: Option<RecommendationTrend>,
}

impl Fundamentals {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            ..Self::default()
        }
    }

    /// Raw value of `metric` in one `source`, if that module carries it.
    pub fn lookup(&self, source: FundamentalSource, metric: Metric) -> Option<f64> {
        match (source, metric) {
            (FundamentalSource::SummaryDetail, Metric::TrailingPe) => self.summary_detail.trailing_pe,
            (FundamentalSource::SummaryDetail, Metric::DividendYield) => {
                self.summary_detail.dividend_yield
            }
            (FundamentalSource::DefaultKeyStatistics, Metric::ReturnOnEquity) => {
                self.key_statistics.return_on_equity
            }
            (FundamentalSource::DefaultKeyStatistics, Metric::ProfitMargins) => {
                self.key_statistics.profit_margins
            }
            (FundamentalSource::DefaultKeyStatistics, Metric::DividendYield) => {
                self.key_statistics.yield_
            }
            (FundamentalSource::FinancialData, Metric::ReturnOnEquity) => {
                self.financial_data.return_on_equity
            }
            (FundamentalSource::FinancialData, Metric::ProfitMargins) => {
                self.financial_data.profit_margins
            }
            _ => None,
        }
    }

    /// First finite value of `metric` along its source chain.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        metric
            .sources()
            .iter()
            .filter_map(|source| self.lookup(*source, metric))
            .find(|v| v.is_finite())
    }

    /// Growth of the first earnings-trend row for the next or current year.
    pub fn earnings_growth(&self) -> Option<f64> {
        self.earnings_trend
            .iter()
            .find(|t| t.period == "+1y" || t.period == "0y")
            .and_then(|t| t.growth)
            .filter(|g| g.is_finite())
    }

    pub fn is_sector(&self, sector: &str) -> bool {
        self.sector.as_deref() == Some(sector)
    }
}
