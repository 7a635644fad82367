mod common;

use std::sync::Arc;

use common::{d, MockFx, MockMarketData};
use portfolio_scoring_core::logging::{init_logger, parse_level};
use portfolio_scoring_core::models::settings::Settings;
use portfolio_scoring_core::providers::frankfurter::FrankfurterProvider;
use portfolio_scoring_core::providers::registry::ProviderRegistry;
use portfolio_scoring_core::providers::traits::{FxRateProvider, MarketDataProvider};
use portfolio_scoring_core::services::price_service::PriceService;

// ═══════════════════════════════════════════════════════════════════
//  Registry construction
// ═══════════════════════════════════════════════════════════════════

mod registry_construction {
    use super::*;

    #[test]
    fn empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(!registry.has_market_data());
        assert!(registry.market_data_providers().is_empty());
        assert!(registry.fx_providers().is_empty());
        assert!(registry.provider_names().is_empty());
    }

    #[test]
    fn registration_order_is_kept() {
        let mut registry = ProviderRegistry::new();
        registry.register_market_data(Arc::new(MockMarketData::new()));
        registry.register_fx(Arc::new(MockFx::new(&[])));
        registry.register_fx(Arc::new(FrankfurterProvider::new()));

        assert!(registry.has_market_data());
        assert_eq!(
            registry.provider_names(),
            vec!["MockMarketData", "MockFx", "Frankfurter"]
        );
    }

    #[test]
    fn defaults_include_yahoo_and_frankfurter() {
        let registry = ProviderRegistry::new_with_defaults();
        let names = registry.provider_names();
        assert!(names.contains(&"Frankfurter".to_string()));
        assert!(names.contains(&"Yahoo Finance".to_string()));
        assert!(registry.has_market_data());
        assert_eq!(registry.fx_providers().len(), 2);
        assert_eq!(registry.fx_providers()[0].name(), "Yahoo Finance");
    }

    #[test]
    fn clones_share_providers() {
        let mut registry = ProviderRegistry::new();
        registry.register_market_data(Arc::new(MockMarketData::new()));
        let copy = registry.clone();
        assert!(Arc::ptr_eq(
            &registry.market_data_providers()[0],
            &copy.market_data_providers()[0]
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Provider fallback
// ═══════════════════════════════════════════════════════════════════

mod provider_fallback {
    use super::*;

    #[tokio::test]
    async fn second_provider_answers_when_first_fails() {
        let broken = Arc::new(MockMarketData::failing());
        let working = Arc::new(MockMarketData::new().with_series("AAA", &[(d(2024, 1, 2), 10.0)]));
        let mut registry = ProviderRegistry::new();
        registry.register_market_data(broken.clone());
        registry.register_market_data(working.clone());

        let points = PriceService::new(registry)
            .fetch_daily_series("AAA", d(2024, 1, 1), d(2024, 1, 3))
            .await
            .unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(broken.call_count(), 1);
        assert_eq!(working.call_count(), 1);
    }

    #[tokio::test]
    async fn first_answer_wins() {
        let first = Arc::new(MockMarketData::new().with_series("AAA", &[(d(2024, 1, 2), 10.0)]));
        let second = Arc::new(MockMarketData::new().with_series("AAA", &[(d(2024, 1, 2), 99.0)]));
        let mut registry = ProviderRegistry::new();
        registry.register_market_data(first);
        registry.register_market_data(second.clone());

        let points = PriceService::new(registry)
            .fetch_daily_series("AAA", d(2024, 1, 1), d(2024, 1, 3))
            .await
            .unwrap();
        assert_eq!(points[0].price, 10.0);
        assert_eq!(second.call_count(), 0);
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let mut registry = ProviderRegistry::new();
        registry.register_market_data(Arc::new(MockMarketData::failing()));
        let err = PriceService::new(registry)
            .fetch_daily_series("AAA", d(2024, 1, 1), d(2024, 1, 3))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mock outage"));
    }

    #[tokio::test]
    async fn fundamentals_degrade_to_none() {
        let mut registry = ProviderRegistry::new();
        registry.register_market_data(Arc::new(MockMarketData::failing()));
        let service = PriceService::new(registry);
        assert!(service.fetch_fundamentals("AAA").await.is_none());
        assert!(service
            .fetch_fundamentals_many(&["AAA".to_string(), "BBB".to_string()])
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn mock_fx_reports_pair_symbols() {
        let fx = MockFx::new(&[("USD", 1.1)]);
        let rates = fx
            .fetch_cross_rates(&["USD".to_string(), "XYZ".to_string()])
            .await
            .unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].symbol, "EURUSD=X");
        assert_eq!(rates[0].quote_currency().as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn mock_quotes_skip_unknown_symbols() {
        let market = MockMarketData::new().with_quote("AAA", 10.0, Some("EUR"));
        let quotes = market
            .fetch_quotes(&["AAA".to_string(), "ZZZ".to_string()])
            .await
            .unwrap();
        assert_eq!(quotes.len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Logging
// ═══════════════════════════════════════════════════════════════════

mod logging {
    use super::*;
    use tracing::Level;

    #[test]
    fn parses_levels() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" warn "), Level::WARN);
        assert_eq!(parse_level("ERROR"), Level::ERROR);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn second_init_is_harmless() {
        let verbosity = Settings::default().verbosity;
        init_logger(&verbosity);
        assert!(!init_logger(&verbosity));
    }
}
