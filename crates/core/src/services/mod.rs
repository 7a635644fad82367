pub mod analytics_service;
pub mod currency_service;
pub mod health_service;
pub mod portfolio_service;
pub mod price_service;
pub mod score_service;
pub mod screener_service;
pub mod twr_calculator;
pub mod valuation_service;
