use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a held instrument.
///
/// Drives diversification grouping and decides whether an instrument
/// takes part in the daily performance walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstrumentType {
    /// Equities. `Action` is the label older snapshots used.
    #[serde(alias = "Action")]
    Stock,
    #[serde(alias = "ETF")]
    Etf,
    Crypto,
    Bond,
    Fund,
    /// Anything without a daily market series (cash, real estate, ...).
    Other,
}

impl InstrumentType {
    /// Whether the market data provider publishes a daily closing series for this type.
    pub fn has_market_history(&self) -> bool {
        matches!(
            self,
            InstrumentType::Stock | InstrumentType::Etf | InstrumentType::Crypto | InstrumentType::Fund
        )
    }

    /// Equities are the only instruments the score model rates.
    pub fn is_equity(&self) -> bool {
        matches!(self, InstrumentType::Stock)
    }
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentType::Stock => write!(f, "Stock"),
            InstrumentType::Etf => write!(f, "ETF"),
            InstrumentType::Crypto => write!(f, "Crypto"),
            InstrumentType::Bond => write!(f, "Bond"),
            InstrumentType::Fund => write!(f, "Fund"),
            InstrumentType::Other => write!(f, "Other"),
        }
    }
}

/// A single buy of an instrument.
///
/// Prices are stored in the reporting currency. Transactions never change
/// after creation; the store only inserts and deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,

    /// Ticker symbol, trimmed and uppercased (e.g., "AAPL", "MC.PA", "BTC-EUR")
    pub symbol: String,

    /// Units bought (always positive)
    pub quantity: f64,

    /// Price paid per unit, in the reporting currency
    pub purchase_price: f64,

    pub purchase_date: NaiveDate,

    pub instrument_type: InstrumentType,

    #[serde(default)]
    pub sector: Option<String>,

    #[serde(default)]
    pub country: Option<String>,

    /// Display name (e.g., "LVMH Moët Hennessy Louis Vuitton")
    #[serde(default)]
    pub long_name: Option<String>,
}

impl Transaction {
    pub fn new(
        symbol: impl Into<String>,
        quantity: f64,
        purchase_price: f64,
        purchase_date: NaiveDate,
        instrument_type: InstrumentType,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: normalize_symbol(&symbol.into()),
            quantity,
            purchase_price,
            purchase_date,
            instrument_type,
            sector: None,
            country: None,
            long_name: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// Amount paid for this buy (`quantity × purchase_price`).
    pub fn cost(&self) -> f64 {
        self.quantity * self.purchase_price
    }
}

/// Canonical form used as the aggregation key for a symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
