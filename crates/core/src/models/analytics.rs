use serde::{Deserialize, Serialize};

use super::transaction::{InstrumentType, Transaction};

/// Current state of the whole portfolio, one row per symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub as_of_date: chrono::NaiveDate,

    /// Currency used for all monetary values
    pub currency: String,

    /// Σ total_value over holdings with a live price
    pub total_value: f64,

    /// Σ total_cost over all holdings
    pub total_invested: f64,

    /// Σ pl_amount over holdings with a live price
    pub total_gain_loss: f64,

    pub holdings: Vec<HoldingSummary>,
}

/// One symbol's aggregated buys plus its live valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub symbol: String,
    pub long_name: Option<String>,
    pub instrument_type: InstrumentType,
    pub sector: Option<String>,
    pub country: Option<String>,

    pub quantity: f64,

    /// Σ quantity × purchase_price
    pub total_cost: f64,

    /// total_cost / quantity
    pub average_price: f64,

    /// Live price in the reporting currency, when the quote resolved
    pub current_price: Option<f64>,

    /// Day change in percent
    pub daily_change_pct: Option<f64>,

    /// (current_price − average_price) × quantity
    pub pl_amount: Option<f64>,

    /// current_price × quantity
    pub total_value: Option<f64>,

    /// total_value / portfolio total value × 100
    pub allocation_pct: Option<f64>,

    /// Underlying buys, oldest first
    pub transactions: Vec<Transaction>,
}
