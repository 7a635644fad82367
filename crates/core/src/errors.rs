use thiserror::Error;

/// Unified error type for the portfolio-scoring-core library.
///
/// Provider failures are normally absorbed at the fetch boundary and turned
/// into "no data"; these variants surface only from validation, settings
/// loading and the raw provider calls themselves.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for {0}")]
    NoProvider(String),

    // ── Market data ─────────────────────────────────────────────────
    #[error("Price not available for {symbol} on {date}")]
    PriceNotAvailable { symbol: String, date: String },

    #[error("Exchange rate not available for {0}")]
    RateNotAvailable(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Transaction validation failed: {0}")]
    ValidationError(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Unknown range code: {0}")]
    InvalidRange(String),

    // ── Serialization / File I/O ────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; Yahoo crumbs and API keys live in the query.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
