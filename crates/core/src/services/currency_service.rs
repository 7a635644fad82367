use std::collections::BTreeSet;

use crate::models::currency::{CurrencyRateTable, QuoteCurrency};
use crate::models::settings::MissingRatePolicy;
use crate::providers::registry::ProviderRegistry;

/// Converts quoted prices into the reporting currency through EUR cross rates.
///
/// - EUR is the base of every rate (`EUR → 1`).
/// - `GBp` and `ILA` are minor units, scaled by 1/100 and priced as GBP / ILS.
/// - Conversion: `amount / rate[from] × rate[reporting]`.
///
/// A rate table is built per computation and handed to whoever needs it;
/// nothing is shared between computations.
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Major ISO codes that need a remote rate to price `currencies` in
    /// `reporting_currency`. EUR and minor units never go to a provider
    /// themselves; their major code does when it isn't EUR.
    pub fn remote_codes<'a>(
        &self,
        currencies: impl IntoIterator<Item = &'a str>,
        reporting_currency: &'a str,
    ) -> Vec<String> {
        let mut codes = BTreeSet::new();
        for code in currencies
            .into_iter()
            .chain(std::iter::once(reporting_currency))
        {
            if code.trim().is_empty() {
                continue;
            }
            let parsed = QuoteCurrency::parse(code);
            let major = QuoteCurrency::parse(parsed.major_code());
            if major.needs_remote_rate() {
                codes.insert(major.major_code().to_string());
            }
        }
        codes.into_iter().collect()
    }

    /// Build the rate table for `currencies` (plus the reporting currency).
    ///
    /// FX providers are asked in registration order for whatever is still
    /// missing. A provider failing for the whole batch is logged and skipped;
    /// the table may come back partial.
    pub async fn build_rate_table(
        &self,
        registry: &ProviderRegistry,
        currencies: &[String],
        reporting_currency: &str,
    ) -> CurrencyRateTable {
        let mut table = CurrencyRateTable::new();
        let mut missing = self.remote_codes(currencies.iter().map(String::as_str), reporting_currency);
        if missing.is_empty() {
            return table;
        }

        for provider in registry.fx_providers() {
            match provider.fetch_cross_rates(&missing).await {
                Ok(rates) => {
                    for rate in rates {
                        if let Some(currency) = rate.quote_currency() {
                            table.set_rate(&currency, rate.regular_market_price);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        "Cross rate fetch failed for {}: {e}",
                        missing.join(",")
                    );
                }
            }
            missing.retain(|code| !table.contains(code));
            if missing.is_empty() {
                break;
            }
        }

        if !missing.is_empty() {
            tracing::warn!("No exchange rate for {}", missing.join(","));
        }
        table
    }

    /// Factor turning a price quoted in `currency` into `reporting_currency`.
    ///
    /// An unknown quote currency is taken to be the reporting currency. A
    /// currency without a rate follows `policy`.
    pub fn conversion_factor(
        &self,
        table: &CurrencyRateTable,
        currency: Option<&str>,
        reporting_currency: &str,
        policy: MissingRatePolicy,
    ) -> Option<f64> {
        let Some(code) = currency.filter(|c| !c.trim().is_empty()) else {
            return Some(1.0);
        };
        let quote_currency = QuoteCurrency::parse(code);
        if quote_currency.major_code() == reporting_currency.to_uppercase() {
            return Some(quote_currency.minor_unit_factor());
        }
        match table.conversion_factor(&quote_currency, reporting_currency) {
            Some(factor) => Some(factor),
            None => match policy {
                MissingRatePolicy::Exclude => None,
                MissingRatePolicy::AssumeParity => Some(quote_currency.minor_unit_factor()),
            },
        }
    }

    /// Convert one price into the reporting currency.
    pub fn convert(
        &self,
        table: &CurrencyRateTable,
        amount: f64,
        currency: Option<&str>,
        reporting_currency: &str,
        policy: MissingRatePolicy,
    ) -> Option<f64> {
        self.conversion_factor(table, currency, reporting_currency, policy)
            .map(|factor| amount * factor)
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
