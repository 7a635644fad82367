pub mod analytics;
pub mod currency;
pub mod fundamentals;
pub mod performance;
pub mod position;
pub mod price;
pub mod quote;
pub mod scores;
pub mod screener;
pub mod settings;
pub mod transaction;
