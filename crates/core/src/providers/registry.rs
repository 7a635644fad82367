use std::sync::Arc;

use super::frankfurter::FrankfurterProvider;
use super::traits::{FxRateProvider, MarketDataProvider};
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of the market data and FX providers available to the engine.
///
/// Market data providers are tried in registration order until one answers;
/// FX providers likewise, so a second FX source only matters when the first
/// fails for the whole batch.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    market_data: Vec<Arc<dyn MarketDataProvider>>,
    fx: Vec<Arc<dyn FxRateProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // Yahoo Finance: history, quotes, fundamentals and EURXXX=X cross rates.
        // Not available on WASM (uses native reqwest/tokio connectors)
        #[cfg(not(target_arch = "wasm32"))]
        {
            match YahooFinanceProvider::new() {
                Ok(yahoo) => {
                    let yahoo = Arc::new(yahoo);
                    registry.register_market_data(yahoo.clone());
                    registry.register_fx(yahoo);
                }
                Err(e) => tracing::warn!("Yahoo Finance provider unavailable: {e}"),
            }
        }

        // Frankfurter: ECB reference rates, fallback FX source
        registry.register_fx(Arc::new(FrankfurterProvider::new()));

        registry
    }

    pub fn register_market_data(&mut self, provider: Arc<dyn MarketDataProvider>) {
        self.market_data.push(provider);
    }

    pub fn register_fx(&mut self, provider: Arc<dyn FxRateProvider>) {
        self.fx.push(provider);
    }

    pub fn market_data_providers(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.market_data
    }

    pub fn fx_providers(&self) -> &[Arc<dyn FxRateProvider>] {
        &self.fx
    }

    pub fn has_market_data(&self) -> bool {
        !self.market_data.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.market_data
            .iter()
            .map(|p| p.name().to_string())
            .chain(self.fx.iter().map(|p| p.name().to_string()))
            .collect()
    }
}
