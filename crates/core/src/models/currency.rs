use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base currency of every cross rate.
pub const BASE_CURRENCY: &str = "EUR";

/// How a quoted currency code is handled before rate lookup.
///
/// Most codes are plain ISO currencies looked up remotely. A few are minor
/// units or aliases that are resolved locally and never sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteCurrency {
    /// The rate base; always 1.
    Eur,
    /// `GBp`: pence sterling, 1/100 GBP (London listings).
    PenceSterling,
    /// `ILA`: agorot, 1/100 ILS (Tel Aviv listings).
    Agorot,
    /// Any other code, uppercased.
    Iso(String),
}

impl QuoteCurrency {
    /// Classify a provider currency code. `GBp` is case-sensitive: `GBP` is
    /// the major unit.
    pub fn parse(code: &str) -> Self {
        let trimmed = code.trim();
        if trimmed == "GBp" {
            return QuoteCurrency::PenceSterling;
        }
        match trimmed.to_uppercase().as_str() {
            "EUR" => QuoteCurrency::Eur,
            "ILA" => QuoteCurrency::Agorot,
            other => QuoteCurrency::Iso(other.to_string()),
        }
    }

    /// Major-unit code used for rate lookup.
    pub fn major_code(&self) -> &str {
        match self {
            QuoteCurrency::Eur => BASE_CURRENCY,
            QuoteCurrency::PenceSterling => "GBP",
            QuoteCurrency::Agorot => "ILS",
            QuoteCurrency::Iso(code) => code,
        }
    }

    /// Factor turning an amount in this unit into the major unit.
    pub fn minor_unit_factor(&self) -> f64 {
        match self {
            QuoteCurrency::PenceSterling | QuoteCurrency::Agorot => 0.01,
            QuoteCurrency::Eur | QuoteCurrency::Iso(_) => 1.0,
        }
    }

    /// Whether a provider must be asked for this code's EUR cross rate.
    pub fn needs_remote_rate(&self) -> bool {
        matches!(self, QuoteCurrency::Iso(_))
    }
}

/// One EUR-quoted cross rate as returned by a provider, e.g. `EURUSD=X → 1.08`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRate {
    pub symbol: String,
    pub regular_market_price: f64,
}

impl CrossRate {
    /// Ticker for the EUR→`currency` pair.
    pub fn pair_symbol(currency: &str) -> String {
        format!("{BASE_CURRENCY}{}=X", currency.to_uppercase())
    }

    /// Quote currency of the pair (`EURUSD=X` → `USD`).
    pub fn quote_currency(&self) -> Option<String> {
        let symbol = self.symbol.trim();
        if symbol.len() >= 6 && symbol.is_char_boundary(3) && symbol.is_char_boundary(6) {
            Some(symbol[3..6].to_uppercase())
        } else {
            None
        }
    }
}

/// Units of each currency per 1 EUR, built fresh for one computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyRateTable {
    rates: HashMap<String, f64>,
}

impl Default for CurrencyRateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(BASE_CURRENCY.to_string(), 1.0);
        Self { rates }
    }
}

impl CurrencyRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rate. EUR stays pinned at 1 and unusable rates are ignored.
    pub fn set_rate(&mut self, currency: &str, units_per_eur: f64) {
        let code = currency.to_uppercase();
        if code == BASE_CURRENCY || !units_per_eur.is_finite() || units_per_eur <= 0.0 {
            return;
        }
        self.rates.insert(code, units_per_eur);
    }

    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(&currency.to_uppercase()).copied()
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.rates.contains_key(&currency.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Factor converting an amount quoted in `from` (possibly a minor unit)
    /// into `to`: `× minor factor / rate[from] × rate[to]`.
    ///
    /// `None` when either major currency has no rate.
    pub fn conversion_factor(&self, from: &QuoteCurrency, to: &str) -> Option<f64> {
        let from_rate = self.rate(from.major_code())?;
        let to_rate = self.rate(to)?;
        Some(from.minor_unit_factor() / from_rate * to_rate)
    }

    /// Convert an amount quoted in `from` into `to`.
    pub fn convert(&self, amount: f64, from: &QuoteCurrency, to: &str) -> Option<f64> {
        self.conversion_factor(from, to).map(|factor| amount * factor)
    }
}
