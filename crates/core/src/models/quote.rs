use serde::{Deserialize, Serialize};

/// Current quote fields of one instrument, in its listing currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Provider code, possibly a minor unit such as `GBp`
    pub currency: Option<String>,
    /// Day change in percent
    pub change_pct: Option<f64>,
    pub long_name: Option<String>,
}

/// A quote converted into the reporting currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedQuote {
    pub symbol: String,
    pub price: f64,
    pub currency: String,
    pub original_price: f64,
    pub original_currency: Option<String>,
    pub change_pct: Option<f64>,
}
