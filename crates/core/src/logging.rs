use tracing::Level;

/// Environment variable that overrides the configured verbosity.
pub const VERBOSITY_ENV: &str = "PORTFOLIO_VERBOSITY";

/// Map a verbosity name to a level, `INFO` for anything unrecognised.
pub fn parse_level(verbosity: &str) -> Level {
    match verbosity.trim().to_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "INFO" => Level::INFO,
        "WARN" => Level::WARN,
        "ERROR" => Level::ERROR,
        other => {
            eprintln!("Invalid verbosity level '{other}', defaulting to INFO");
            Level::INFO
        }
    }
}

/// Install a `fmt` subscriber at `verbosity` (or `PORTFOLIO_VERBOSITY` when set).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logger(verbosity: &str) -> bool {
    let verbosity = std::env::var(VERBOSITY_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| verbosity.to_string());
    let level = parse_level(&verbosity);

    tracing_subscriber::fmt().with_max_level(level).try_init().is_ok()
}
