use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::currency::CrossRate;
use crate::models::fundamentals::Fundamentals;
use crate::models::price::PricePoint;
use crate::models::quote::Quote;

/// Source of daily price history, live quotes and fundamentals.
///
/// Implementations report failures as errors; the services decide how a
/// failure degrades (usually to "no data for this symbol").
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Daily closes of `symbol` between `from` and `to` (inclusive), in the
    /// instrument's listing currency. May have holes; sorted by date.
    async fn fetch_daily_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PricePoint>, CoreError>;

    /// Current quotes for a batch of symbols. Symbols the provider does not
    /// know are left out of the result.
    async fn fetch_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>, CoreError>;

    /// Fundamentals snapshot of one instrument.
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, CoreError>;
}

/// Source of EUR-quoted cross rates.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait FxRateProvider: Send + Sync {
    fn name(&self) -> &str;

    /// EUR→currency rates for a batch of ISO codes, one `EURXXX=X` entry per
    /// currency the provider could price.
    async fn fetch_cross_rates(&self, currencies: &[String]) -> Result<Vec<CrossRate>, CoreError>;
}
