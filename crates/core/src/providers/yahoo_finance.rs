use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::{header, Client};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;
use time::OffsetDateTime;

use super::traits::{FxRateProvider, MarketDataProvider};
use crate::errors::CoreError;
use crate::models::currency::CrossRate;
use crate::models::fundamentals::{
    EarningsTrendEntry, FinancialData, Fundamentals, KeyStatistics, RecommendationTrend,
    SummaryDetail,
};
use crate::models::price::PricePoint;
use crate::models::quote::Quote;

const PROVIDER: &str = "Yahoo Finance";
const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const SUMMARY_MODULES: &str =
    "assetProfile,summaryDetail,defaultKeyStatistics,financialData,earningsTrend,recommendationTrend";

/// Yahoo Finance provider for history, quotes, fundamentals and cross rates.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices, funds, crypto pairs and
///   `EURXXX=X` currency pairs.
///
/// Daily history goes through the `yahoo_finance_api` crate. Quote and
/// quoteSummary endpoints need a cookie + crumb pair, fetched once and
/// reused until a request is rejected.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
    client: Client,
    session: RwLock<Option<YahooSession>>,
}

#[derive(Debug, Clone)]
struct YahooSession {
    cookie: String,
    crumb: String,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;
        Ok(Self {
            connector,
            client,
            session: RwLock::new(None),
        })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let invalid = |e: String| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid date {date}: {e}"),
        };
        let month = time::Month::try_from(date.month() as u8).map_err(|e| invalid(e.to_string()))?;
        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| invalid(e.to_string()))?
            .with_hms(0, 0, 0)
            .map_err(|e| invalid(e.to_string()))?
            .assume_utc();
        Ok(odt)
    }

    /// Convert a unix timestamp (seconds) to `chrono::NaiveDate`.
    fn timestamp_to_naive_date(ts: i64) -> Option<NaiveDate> {
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }

    fn api_error(message: String) -> CoreError {
        CoreError::Api {
            provider: PROVIDER.into(),
            message,
        }
    }

    async fn session(&self) -> Result<YahooSession, CoreError> {
        let cached = self
            .session
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().cloned());
        if let Some(session) = cached {
            return Ok(session);
        }

        let response = self.client.get(COOKIE_URL).send().await?;
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(value, _)| value.to_string()))
            .ok_or_else(|| Self::api_error("No session cookie in response".into()))?;

        let crumb = self
            .client
            .get(CRUMB_URL)
            .header(header::COOKIE, &cookie)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        if crumb.trim().is_empty() {
            return Err(Self::api_error("Empty crumb".into()));
        }

        let session = YahooSession {
            cookie,
            crumb: crumb.trim().to_string(),
        };
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(session.clone());
        }
        tracing::debug!("Opened Yahoo Finance session");
        Ok(session)
    }

    fn reset_session(&self) {
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
    }

    /// GET a crumb-authenticated JSON endpoint, retrying once with a fresh
    /// session when Yahoo rejects the crumb.
    async fn get_authenticated<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        for attempt in 0..2 {
            let session = self.session().await?;
            let response = self
                .client
                .get(url)
                .query(query)
                .query(&[("crumb", session.crumb.as_str())])
                .header(header::COOKIE, &session.cookie)
                .send()
                .await?;

            let status = response.status();
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                self.reset_session();
                if attempt == 0 {
                    continue;
                }
            }
            let body = response.error_for_status()?.text().await?;
            return serde_json::from_str(&body)
                .map_err(|e| Self::api_error(format!("Failed to parse response from {url}: {e}")));
        }
        Err(Self::api_error(format!("Session rejected for {url}")))
    }
}

// ── Yahoo API response types ────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<QuoteItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteItem {
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_change_percent: Option<f64>,
    currency: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEnvelope {
    quote_summary: SummaryResponse,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SummaryResult {
    asset_profile: Option<AssetProfileModule>,
    summary_detail: Option<SummaryDetailModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    financial_data: Option<FinancialDataModule>,
    earnings_trend: Option<EarningsTrendModule>,
    recommendation_trend: Option<RecommendationTrendModule>,
}

/// `{ "raw": 0.15, "fmt": "15.00%" }`; Yahoo sends `{}` for missing values.
#[derive(Deserialize, Default, Clone, Copy)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: &Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

#[derive(Deserialize)]
struct AssetProfileModule {
    sector: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    dividend_yield: Option<RawValue>,
    dividend_rate: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    return_on_equity: Option<RawValue>,
    profit_margins: Option<RawValue>,
    #[serde(rename = "yield")]
    yield_: Option<RawValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    return_on_equity: Option<RawValue>,
    profit_margins: Option<RawValue>,
}

#[derive(Deserialize)]
struct EarningsTrendModule {
    #[serde(default)]
    trend: Vec<EarningsTrendRow>,
}

#[derive(Deserialize)]
struct EarningsTrendRow {
    period: String,
    growth: Option<RawValue>,
}

#[derive(Deserialize)]
struct RecommendationTrendModule {
    #[serde(default)]
    trend: Vec<RecommendationRow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationRow {
    strong_buy: Option<u32>,
    buy: Option<u32>,
    hold: Option<u32>,
    sell: Option<u32>,
    strong_sell: Option<u32>,
}

impl SummaryResult {
    fn into_fundamentals(self, symbol: &str) -> Fundamentals {
        let mut fundamentals = Fundamentals::new(symbol);
        fundamentals.sector = self.asset_profile.and_then(|p| p.sector);
        if let Some(detail) = self.summary_detail {
            fundamentals.summary_detail = SummaryDetail {
                trailing_pe: raw(&detail.trailing_pe),
                dividend_yield: raw(&detail.dividend_yield),
                dividend_rate: raw(&detail.dividend_rate),
                market_cap: raw(&detail.market_cap),
            };
        }
        if let Some(stats) = self.default_key_statistics {
            fundamentals.key_statistics = KeyStatistics {
                return_on_equity: raw(&stats.return_on_equity),
                profit_margins: raw(&stats.profit_margins),
                yield_: raw(&stats.yield_),
            };
        }
        if let Some(financial) = self.financial_data {
            fundamentals.financial_data = FinancialData {
                return_on_equity: raw(&financial.return_on_equity),
                profit_margins: raw(&financial.profit_margins),
            };
        }
        if let Some(trend) = self.earnings_trend {
            fundamentals.earnings_trend = trend
                .trend
                .into_iter()
                .map(|row| EarningsTrendEntry {
                    period: row.period,
                    growth: raw(&row.growth),
                })
                .collect();
        }
        fundamentals.recommendation = self
            .recommendation_trend
            .and_then(|t| t.trend.into_iter().next())
            .map(|row| RecommendationTrend {
                strong_buy: row.strong_buy,
                buy: row.buy,
                hold: row.hold,
                sell: row.sell,
                strong_sell: row.strong_sell,
            });
        fundamentals
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to + chrono::Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| Self::api_error(format!("Failed to fetch history for {symbol}: {e}")))?;

        let quotes = resp
            .quotes()
            .map_err(|e| Self::api_error(format!("Failed to parse quotes for {symbol}: {e}")))?;

        let mut points: Vec<PricePoint> = quotes
            .iter()
            .filter_map(|q| {
                let date = Self::timestamp_to_naive_date(q.timestamp)?;
                (date >= from && date <= to && q.close.is_finite()).then_some(PricePoint {
                    date,
                    price: q.close,
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, CoreError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let joined = symbols.join(",");
        let envelope: QuoteEnvelope = self
            .get_authenticated(QUOTE_URL, &[("symbols", joined.as_str())])
            .await?;

        Ok(envelope
            .quote_response
            .result
            .into_iter()
            .filter_map(|item| {
                let price = item.regular_market_price.filter(|p| p.is_finite())?;
                Some(Quote {
                    symbol: item.symbol,
                    price,
                    currency: item.currency,
                    change_pct: item.regular_market_change_percent,
                    long_name: item.long_name.or(item.short_name),
                })
            })
            .collect())
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, CoreError> {
        let url = format!("{SUMMARY_URL}/{symbol}");
        let envelope: SummaryEnvelope = self
            .get_authenticated(&url, &[("modules", SUMMARY_MODULES)])
            .await?;

        let result = envelope
            .quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| Self::api_error(format!("No fundamentals for {symbol}")))?;
        Ok(result.into_fundamentals(symbol))
    }
}

#[async_trait]
impl FxRateProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_cross_rates(&self, currencies: &[String]) -> Result<Vec<CrossRate>, CoreError> {
        let pairs: Vec<String> = currencies.iter().map(|c| CrossRate::pair_symbol(c)).collect();
        let quotes = self.fetch_quotes(&pairs).await?;
        Ok(quotes
            .into_iter()
            .filter(|q| q.price > 0.0)
            .map(|q| CrossRate {
                symbol: q.symbol,
                regular_market_price: q.price,
            })
            .collect())
    }
}
