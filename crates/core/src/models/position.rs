use serde::{Deserialize, Serialize};

use super::transaction::InstrumentType;

/// All buys of one symbol aggregated up to a cutoff date.
///
/// Derived on demand and never stored. `total_quantity` only ever grows
/// since sells are not modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,

    /// Σ quantity
    pub total_quantity: f64,

    /// Σ quantity × purchase_price, in the reporting currency
    pub total_cost: f64,

    /// Taken from the first transaction seen for the symbol
    pub instrument_type: InstrumentType,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub long_name: Option<String>,
}

impl Position {
    /// Average price paid per unit, or 0 for an empty position.
    pub fn average_price(&self) -> f64 {
        if self.total_quantity > 0.0 {
            self.total_cost / self.total_quantity
        } else {
            0.0
        }
    }
}
