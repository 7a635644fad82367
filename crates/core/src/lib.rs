pub mod errors;
pub mod logging;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{NaiveDate, Utc};
use models::{
    analytics::PortfolioSummary,
    performance::{PerformanceReport, RangeCode},
    quote::ConvertedQuote,
    scores::{HealthScore, ScoreSet},
    screener::{ScreenerFilters, ScreenerHit},
    settings::Settings,
    transaction::{normalize_symbol, InstrumentType, Transaction},
};
use providers::registry::ProviderRegistry;
use services::{
    analytics_service::AnalyticsService,
    health_service::{HealthService, ValuedPosition},
    portfolio_service::PortfolioService,
    price_service::PriceService,
    score_service::ScoreService,
    screener_service::ScreenerService,
    valuation_service::ValuationService,
};
use std::collections::{HashMap, HashSet};
use storage::{
    memory::{validate_transaction, InMemoryTransactionStore},
    snapshot,
    traits::TransactionStore,
};
use uuid::Uuid;

use errors::CoreError;

/// Main entry point of the portfolio scoring library.
///
/// Owns the transaction store, the settings and the services. Every
/// computation fetches its own price series and rate table; nothing is
/// cached between calls.
#[must_use]
pub struct PortfolioEngine {
    store: Box<dyn TransactionStore>,
    settings: Settings,
    portfolio_service: PortfolioService,
    price_service: PriceService,
    analytics_service: AnalyticsService,
}

impl std::fmt::Debug for PortfolioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioEngine")
            .field("transactions", &self.store.len())
            .field("settings", &self.settings)
            .field("providers", &self.price_service.registry().provider_names())
            .finish()
    }
}

impl PortfolioEngine {
    /// Engine with the default providers and an empty in-memory store.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        Self::with_registry(ProviderRegistry::new_with_defaults(), settings)
    }

    /// Engine with a custom provider registry and an empty in-memory store.
    pub fn with_registry(registry: ProviderRegistry, settings: Settings) -> Result<Self, CoreError> {
        Self::with_parts(registry, Box::new(InMemoryTransactionStore::new()), settings)
    }

    pub fn with_parts(
        registry: ProviderRegistry,
        store: Box<dyn TransactionStore>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self {
            store,
            settings,
            portfolio_service: PortfolioService::new(),
            price_service: PriceService::new(registry),
            analytics_service: AnalyticsService::new(),
        })
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings after validating them.
    pub fn set_settings(&mut self, mut settings: Settings) -> Result<(), CoreError> {
        settings.reporting_currency = settings.reporting_currency.trim().to_uppercase();
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.price_service.registry().provider_names()
    }

    fn valuation_service(&self) -> ValuationService {
        ValuationService::new(self.settings.price_lookback_days)
    }

    fn score_service(&self) -> ScoreService {
        ScoreService::new(self.settings.score.clone())
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    // ── Transactions ────────────────────────────────────────────────

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<Uuid, CoreError> {
        self.store.insert(transaction)
    }

    /// Record a buy at the market close of `date` (or the first close up to
    /// three days later), converted into the reporting currency.
    pub async fn add_transaction_at_market(
        &mut self,
        symbol: &str,
        quantity: f64,
        date: NaiveDate,
        instrument_type: InstrumentType,
    ) -> Result<Uuid, CoreError> {
        let symbol = normalize_symbol(symbol);
        let price = self
            .price_service
            .resolve_purchase_price(&symbol, date, &self.settings)
            .await?;
        tracing::info!("Resolved {symbol} purchase price on {date}: {price:.4} {}", self.settings.reporting_currency);
        self.add_transaction(Transaction::new(symbol, quantity, price, date, instrument_type))
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Result<Transaction, CoreError> {
        self.store.delete(id)
    }

    #[must_use]
    pub fn get_transaction(&self, id: Uuid) -> Option<Transaction> {
        self.store.get(id)
    }

    /// All transactions, oldest purchase first.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.list()
    }

    pub fn export_transactions_json(&self) -> Result<String, CoreError> {
        snapshot::export_json(&self.store.list())
    }

    /// Add every transaction of a snapshot document.
    ///
    /// The whole document is checked first; nothing is added if any
    /// transaction is invalid or already present.
    pub fn import_transactions_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let imported = snapshot::import_json(json)?;
        let today = Self::today();
        let mut seen = HashSet::new();
        for transaction in &imported {
            validate_transaction(transaction, today)?;
            if !seen.insert(transaction.id) || self.store.get(transaction.id).is_some() {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate transaction id {}",
                    transaction.id
                )));
            }
        }

        let count = imported.len();
        for transaction in imported {
            self.store.insert(transaction)?;
        }
        tracing::info!("Imported {count} transactions");
        Ok(count)
    }

    // ── Performance ─────────────────────────────────────────────────

    /// Daily P&L and time-weighted return series up to today.
    pub async fn performance(&self, range: RangeCode) -> PerformanceReport {
        self.performance_as_of(range, Self::today()).await
    }

    /// Same as `performance`, for a range code string (unknown codes mean `1y`).
    pub async fn performance_for_code(&self, code: &str) -> PerformanceReport {
        self.performance(RangeCode::parse_lenient(code)).await
    }

    /// Daily P&L and time-weighted return series up to `today`.
    ///
    /// Only instruments with a daily market series take part. Prices are
    /// fetched far enough back for the first walked day's "yesterday" to
    /// resolve with the full lookback.
    pub async fn performance_as_of(&self, range: RangeCode, today: NaiveDate) -> PerformanceReport {
        let transactions = self.portfolio_service.market_traded(&self.store.list());
        let valuation = self.valuation_service();

        let Some(walk_start) = valuation.walk_start(&transactions, range.start_date(today)) else {
            return PerformanceReport::default();
        };
        if walk_start > today {
            return PerformanceReport::default();
        }

        let from = valuation.fetch_start(walk_start);
        let symbols = self.portfolio_service.symbols(&transactions);
        let series = self
            .price_service
            .fetch_reporting_series(&symbols, from, today, &self.settings)
            .await;

        valuation.compute(&transactions, &series, walk_start, today)
    }

    // ── Scores ──────────────────────────────────────────────────────

    /// Score set of one instrument, `None` when its fundamentals are unavailable.
    pub async fn instrument_scores(&self, symbol: &str) -> Option<ScoreSet> {
        let fundamentals = self
            .price_service
            .fetch_fundamentals(&normalize_symbol(symbol))
            .await?;
        Some(self.score_service().score(&fundamentals))
    }

    pub async fn health_score(&self) -> HealthScore {
        self.health_score_as_of(Self::today()).await
    }

    /// Portfolio health as of `today`.
    ///
    /// An empty portfolio scores zero without any provider call.
    pub async fn health_score_as_of(&self, today: NaiveDate) -> HealthScore {
        let transactions = self.store.list();
        if transactions.is_empty() {
            return HealthScore::zero();
        }

        let positions = self.portfolio_service.positions_as_of(&transactions, today);
        let quoted: Vec<String> = positions
            .iter()
            .filter(|p| p.instrument_type.has_market_history())
            .map(|p| p.symbol.clone())
            .collect();
        let equities: Vec<String> = positions
            .iter()
            .filter(|p| p.instrument_type.is_equity())
            .map(|p| p.symbol.clone())
            .collect();

        let (quotes, fundamentals, report) = futures::join!(
            self.price_service.live_quotes(&quoted, &self.settings),
            self.price_service.fetch_fundamentals_many(&equities),
            self.performance_as_of(self.settings.health.performance_range, today),
        );

        let prices: HashMap<String, f64> = quotes
            .into_iter()
            .map(|q| (normalize_symbol(&q.symbol), q.price))
            .collect();
        let valued: Vec<ValuedPosition> = positions
            .into_iter()
            .map(|p| {
                let price = prices.get(&p.symbol).copied();
                ValuedPosition::new(p, price)
            })
            .collect();

        let score_service = self.score_service();
        let scores: HashMap<String, ScoreSet> = fundamentals
            .iter()
            .map(|(symbol, f)| (symbol.clone(), score_service.score(f)))
            .collect();

        HealthService::new(self.settings.health.clone()).compute(&valued, &scores, &report.daily_returns)
    }

    // ── Holdings & Quotes ───────────────────────────────────────────

    pub async fn portfolio_summary(&self) -> PortfolioSummary {
        self.portfolio_summary_as_of(Self::today()).await
    }

    /// Per-symbol holdings with live value and P&L as of `as_of_date`.
    pub async fn portfolio_summary_as_of(&self, as_of_date: NaiveDate) -> PortfolioSummary {
        let transactions = self.store.list();
        let symbols = self.portfolio_service.symbols(&transactions);
        let quotes: HashMap<String, ConvertedQuote> = self
            .price_service
            .live_quotes(&symbols, &self.settings)
            .await
            .into_iter()
            .map(|q| (normalize_symbol(&q.symbol), q))
            .collect();

        self.analytics_service.summarize_holdings(
            &transactions,
            &quotes,
            as_of_date,
            &self.settings.reporting_currency,
        )
    }

    /// Live quotes of arbitrary symbols in the reporting currency.
    pub async fn live_quotes(&self, symbols: &[String]) -> Vec<ConvertedQuote> {
        let symbols: Vec<String> = symbols.iter().map(|s| normalize_symbol(s)).collect();
        self.price_service.live_quotes(&symbols, &self.settings).await
    }

    /// Price change of one symbol over `range`, in percent.
    pub async fn simple_return(&self, symbol: &str, range: RangeCode) -> Option<f64> {
        self.price_service
            .simple_return(&normalize_symbol(symbol), range, Self::today())
            .await
    }

    // ── Screener ────────────────────────────────────────────────────

    /// Screen `candidates` on fundamentals, scores and performance.
    pub async fn screen(&self, candidates: &[String], filters: &ScreenerFilters) -> Vec<ScreenerHit> {
        let candidates: Vec<String> = candidates.iter().map(|s| normalize_symbol(s)).collect();
        ScreenerService::new(self.score_service())
            .screen(&self.price_service, &candidates, filters, Self::today())
            .await
    }
}
