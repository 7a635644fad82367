#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use portfolio_scoring_core::errors::CoreError;
use portfolio_scoring_core::models::currency::CrossRate;
use portfolio_scoring_core::models::fundamentals::Fundamentals;
use portfolio_scoring_core::models::price::PricePoint;
use portfolio_scoring_core::models::quote::Quote;
use portfolio_scoring_core::providers::registry::ProviderRegistry;
use portfolio_scoring_core::providers::traits::{FxRateProvider, MarketDataProvider};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ═══════════════════════════════════════════════════════════════════
// Mock market data provider
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockMarketData {
    pub series: HashMap<String, Vec<PricePoint>>,
    pub quotes: HashMap<String, Quote>,
    pub fundamentals: HashMap<String, Fundamentals>,
    pub fail: bool,
    pub fail_quotes: bool,
    pub calls: AtomicUsize,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// History and fundamentals keep answering; every quote batch errors.
    pub fn with_failing_quotes(mut self) -> Self {
        self.fail_quotes = true;
        self
    }

    pub fn with_series(mut self, symbol: &str, closes: &[(NaiveDate, f64)]) -> Self {
        let points = closes
            .iter()
            .map(|(date, price)| PricePoint {
                date: *date,
                price: *price,
            })
            .collect();
        self.series.insert(symbol.to_string(), points);
        self
    }

    pub fn with_quote(mut self, symbol: &str, price: f64, currency: Option<&str>) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            Quote {
                symbol: symbol.to_string(),
                price,
                currency: currency.map(str::to_string),
                change_pct: Some(1.5),
                long_name: Some(format!("{symbol} Corp")),
            },
        );
        self
    }

    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals.insert(fundamentals.symbol.clone(), fundamentals);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CoreError::Network("mock outage".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    fn name(&self) -> &str {
        "MockMarketData"
    }

    async fn fetch_daily_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        self.check()?;
        let points = self.series.get(symbol).ok_or_else(|| CoreError::Api {
            provider: "MockMarketData".into(),
            message: format!("unknown symbol {symbol}"),
        })?;
        Ok(points
            .iter()
            .filter(|p| p.date >= from && p.date <= to)
            .cloned()
            .collect())
    }

    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, CoreError> {
        self.check()?;
        if self.fail_quotes {
            return Err(CoreError::Network("quote outage".into()));
        }
        Ok(symbols
            .iter()
            .filter_map(|s| self.quotes.get(s).cloned())
            .collect())
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, CoreError> {
        self.check()?;
        self.fundamentals
            .get(symbol)
            .cloned()
            .ok_or_else(|| CoreError::Api {
                provider: "MockMarketData".into(),
                message: format!("no fundamentals for {symbol}"),
            })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Mock FX provider
// ═══════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockFx {
    pub rates: HashMap<String, f64>,
    pub fail: bool,
    pub requested: std::sync::Mutex<Vec<Vec<String>>>,
}

impl MockFx {
    pub fn new(rates: &[(&str, f64)]) -> Self {
        Self {
            rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl FxRateProvider for MockFx {
    fn name(&self) -> &str {
        "MockFx"
    }

    async fn fetch_cross_rates(&self, currencies: &[String]) -> Result<Vec<CrossRate>, CoreError> {
        self.requested.lock().unwrap().push(currencies.to_vec());
        if self.fail {
            return Err(CoreError::Network("fx outage".into()));
        }
        Ok(currencies
            .iter()
            .filter_map(|c| {
                self.rates.get(c).map(|rate| CrossRate {
                    symbol: CrossRate::pair_symbol(c),
                    regular_market_price: *rate,
                })
            })
            .collect())
    }
}

/// Registry with one mock market data provider and one mock FX provider.
pub fn registry(market: Arc<MockMarketData>, fx: Arc<MockFx>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register_market_data(market);
    registry.register_fx(fx);
    registry
}
