use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::FxRateProvider;
use crate::errors::CoreError;
use crate::models::currency::{CrossRate, BASE_CURRENCY};

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Frankfurter API provider for EUR cross rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) reference rates.
/// - **Coverage**: ~30 currencies; minor and exotic codes are simply absent
///   from the answer.
///
/// ECB rates are published once per working day, so this is a fallback for
/// when the Yahoo batch fails.
pub struct FrankfurterProvider {
    client: Client,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FxRateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    async fn fetch_cross_rates(&self, currencies: &[String]) -> Result<Vec<CrossRate>, CoreError> {
        let wanted: Vec<String> = currencies
            .iter()
            .map(|c| c.to_uppercase())
            .filter(|c| c != BASE_CURRENCY)
            .collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{BASE_URL}/latest?base={BASE_CURRENCY}&symbols={}",
            wanted.join(",")
        );

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse rates for {}: {e}", wanted.join(",")),
            })?;

        let mut rates: Vec<CrossRate> = resp
            .rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .map(|(currency, rate)| CrossRate {
                symbol: CrossRate::pair_symbol(&currency),
                regular_market_price: rate,
            })
            .collect();
        rates.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(rates)
    }
}
