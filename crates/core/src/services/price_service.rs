use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::currency::CurrencyRateTable;
use crate::models::fundamentals::Fundamentals;
use crate::models::performance::RangeCode;
use crate::models::price::{PricePoint, PriceSeries};
use crate::models::quote::{ConvertedQuote, Quote};
use crate::models::settings::{MissingRatePolicy, Settings};
use crate::providers::registry::ProviderRegistry;
use crate::services::currency_service::CurrencyService;

/// Days after a purchase date searched for the first close.
const PURCHASE_PRICE_WINDOW_DAYS: i64 = 3;

/// Fetches market data from the registered providers.
///
/// Every fetch for a distinct symbol runs concurrently and is awaited
/// jointly. A symbol whose fetch fails everywhere comes back empty; it never
/// fails the batch.
pub struct PriceService {
    registry: ProviderRegistry,
    currency_service: CurrencyService,
}

impl PriceService {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            currency_service: CurrencyService::new(),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Daily closes of one symbol, trying providers in order.
    pub async fn fetch_daily_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError> {
        let providers = self.registry.market_data_providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider("market data".into()));
        }

        let mut last_error = None;
        for provider in providers {
            match provider.fetch_daily_series(symbol, from, to).await {
                Ok(points) => return Ok(points),
                Err(e) => {
                    tracing::debug!(provider = provider.name(), "History fetch failed for {symbol}: {e}");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| CoreError::NoProvider("market data".into())))
    }

    /// Daily closes of every symbol in its listing currency.
    pub async fn fetch_series(&self, symbols: &[String], from: NaiveDate, to: NaiveDate) -> PriceSeries {
        let fetches = symbols
            .iter()
            .map(|symbol| async move { (symbol, self.fetch_daily_series(symbol, from, to).await) });
        let results = join_all(fetches).await;

        let mut series = PriceSeries::new();
        for (symbol, result) in results {
            match result {
                Ok(points) => {
                    tracing::debug!("Fetched {} closes for {symbol}", points.len());
                    series.insert_series(symbol, &points);
                }
                Err(e) => {
                    tracing::warn!("No price history for {symbol}: {e}");
                    series.insert_empty(symbol);
                }
            }
        }
        series
    }

    /// Current quotes keyed by uppercased symbol. Empty when every provider fails.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> HashMap<String, Quote> {
        if symbols.is_empty() {
            return HashMap::new();
        }
        for provider in self.registry.market_data_providers() {
            match provider.fetch_quotes(symbols).await {
                Ok(quotes) => {
                    return quotes
                        .into_iter()
                        .map(|q| (q.symbol.trim().to_uppercase(), q))
                        .collect();
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), "Quote fetch failed: {e}");
                }
            }
        }
        HashMap::new()
    }

    /// Fundamentals of one symbol, `None` when no provider has them.
    pub async fn fetch_fundamentals(&self, symbol: &str) -> Option<Fundamentals> {
        for provider in self.registry.market_data_providers() {
            match provider.fetch_fundamentals(symbol).await {
                Ok(fundamentals) => return Some(fundamentals),
                Err(e) => {
                    tracing::debug!(provider = provider.name(), "Fundamentals fetch failed for {symbol}: {e}");
                }
            }
        }
        tracing::warn!("No fundamentals for {symbol}");
        None
    }

    /// Fundamentals of many symbols, fetched concurrently.
    pub async fn fetch_fundamentals_many(&self, symbols: &[String]) -> HashMap<String, Fundamentals> {
        let fetches = symbols
            .iter()
            .map(|symbol| async move { (symbol.to_uppercase(), self.fetch_fundamentals(symbol).await) });
        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(symbol, fundamentals)| fundamentals.map(|f| (symbol, f)))
            .collect()
    }

    /// Rate table covering the currencies of `quotes`.
    pub async fn rate_table_for(&self, quotes: &HashMap<String, Quote>, settings: &Settings) -> CurrencyRateTable {
        let currencies: Vec<String> = quotes.values().filter_map(|q| q.currency.clone()).collect();
        self.currency_service
            .build_rate_table(&self.registry, &currencies, &settings.reporting_currency)
            .await
    }

    /// Daily closes of every symbol, converted into the reporting currency.
    ///
    /// History and quotes (for each symbol's listing currency) are fetched
    /// together. Under `MissingRatePolicy::Exclude` a symbol whose currency
    /// has no rate, or that came back without a quote, ends up with an empty
    /// series.
    pub async fn fetch_reporting_series(
        &self,
        symbols: &[String],
        from: NaiveDate,
        to: NaiveDate,
        settings: &Settings,
    ) -> PriceSeries {
        let (mut series, quotes) =
            futures::join!(self.fetch_series(symbols, from, to), self.fetch_quotes(symbols));
        let table = self.rate_table_for(&quotes, settings).await;

        for symbol in symbols {
            match self.listing_factor(&table, &quotes, symbol, settings) {
                Some(factor) if factor != 1.0 => series.scale(symbol, factor),
                Some(_) => {}
                None => {
                    let currency = quotes
                        .get(&symbol.to_uppercase())
                        .and_then(|q| q.currency.as_deref())
                        .unwrap_or("an unknown listing currency");
                    tracing::warn!(
                        "Dropping prices of {symbol}: no {} rate for {currency}",
                        settings.reporting_currency
                    );
                    series.clear_symbol(symbol);
                }
            }
        }
        tracing::debug!(
            "Reporting series ready: {} closes for {} symbols",
            series.total_entries(),
            symbols.len()
        );
        series
    }

    /// Factor turning `symbol`'s listing-currency prices into the reporting
    /// currency.
    ///
    /// A symbol missing from `quotes` (failed or partial quote batch) has an
    /// unknown listing currency and follows the missing-rate policy. A quote
    /// that carries no currency is priced in the reporting currency.
    fn listing_factor(
        &self,
        table: &CurrencyRateTable,
        quotes: &HashMap<String, Quote>,
        symbol: &str,
        settings: &Settings,
    ) -> Option<f64> {
        match quotes.get(&symbol.to_uppercase()) {
            Some(quote) => self.currency_service.conversion_factor(
                table,
                quote.currency.as_deref(),
                &settings.reporting_currency,
                settings.missing_rate_policy,
            ),
            None => match settings.missing_rate_policy {
                MissingRatePolicy::Exclude => None,
                MissingRatePolicy::AssumeParity => Some(1.0),
            },
        }
    }

    /// Price paid for `symbol` on `date`, in the reporting currency.
    ///
    /// Uses the first close within three days after `date` so that a
    /// weekend or holiday purchase date still finds a price.
    pub async fn resolve_purchase_price(
        &self,
        symbol: &str,
        date: NaiveDate,
        settings: &Settings,
    ) -> Result<f64, CoreError> {
        let to = date + Duration::days(PURCHASE_PRICE_WINDOW_DAYS);
        let wanted = vec![symbol.to_string()];
        let (history, quotes) =
            futures::join!(self.fetch_daily_series(symbol, date, to), self.fetch_quotes(&wanted));

        let close = history?
            .into_iter()
            .find(|p| p.price.is_finite() && p.price > 0.0)
            .map(|p| p.price)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: symbol.to_string(),
                date: date.to_string(),
            })?;

        let table = self.rate_table_for(&quotes, settings).await;
        let factor = self
            .listing_factor(&table, &quotes, symbol, settings)
            .ok_or_else(|| {
                let currency = quotes
                    .get(&symbol.to_uppercase())
                    .and_then(|q| q.currency.clone())
                    .unwrap_or_else(|| symbol.to_string());
                CoreError::RateNotAvailable(currency)
            })?;
        Ok(close * factor)
    }

    /// Live quotes converted into the reporting currency.
    ///
    /// Symbols whose currency has no rate are left out under
    /// `MissingRatePolicy::Exclude`.
    pub async fn live_quotes(&self, symbols: &[String], settings: &Settings) -> Vec<ConvertedQuote> {
        let quotes = self.fetch_quotes(symbols).await;
        if quotes.is_empty() {
            return Vec::new();
        }
        let table = self.rate_table_for(&quotes, settings).await;
        self.convert_quotes(&quotes, &table, settings)
    }

    /// Convert fetched quotes with an existing rate table, sorted by symbol.
    pub fn convert_quotes(
        &self,
        quotes: &HashMap<String, Quote>,
        table: &CurrencyRateTable,
        settings: &Settings,
    ) -> Vec<ConvertedQuote> {
        let mut converted: Vec<ConvertedQuote> = quotes
            .values()
            .filter_map(|q| {
                let price = self.currency_service.convert(
                    table,
                    q.price,
                    q.currency.as_deref(),
                    &settings.reporting_currency,
                    settings.missing_rate_policy,
                )?;
                Some(ConvertedQuote {
                    symbol: q.symbol.clone(),
                    price,
                    currency: settings.reporting_currency.clone(),
                    original_price: q.price,
                    original_currency: q.currency.clone(),
                    change_pct: q.change_pct,
                })
            })
            .collect();
        converted.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        converted
    }

    /// Price change of `symbol` over `range`, in percent, from its first to
    /// its last close. `None` with fewer than two closes.
    pub async fn simple_return(&self, symbol: &str, range: RangeCode, today: NaiveDate) -> Option<f64> {
        let points = self
            .fetch_daily_series(symbol, range.start_date(today), today)
            .await
            .ok()?;
        simple_return_of(&points)
    }
}

/// `(last − first) / first × 100` over an ordered series.
pub fn simple_return_of(points: &[PricePoint]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let first = points.first()?.price;
    let last = points.last()?.price;
    (first > 0.0).then(|| (last - first) / first * 100.0)
}
