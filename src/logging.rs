//! Structured logging setup
//!
//! Logs go to stderr so that result output on stdout stays pipeable.
//! Filter priority: `-v` flags > SFDB_ADMIN_LOG > RUST_LOG > settings > default.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before RUST_LOG
pub const LOG_ENV: &str = "SFDB_ADMIN_LOG";

/// Initialize the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging(verbosity: u8, configured: Option<&str>) {
    let filter = build_env_filter(verbosity, configured);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_env_filter(verbosity: u8, configured: Option<&str>) -> EnvFilter {
    if let Some(directive) = verbosity_filter(verbosity) {
        return EnvFilter::new(directive);
    }

    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| match configured {
            Some(directive) => EnvFilter::try_new(directive),
            None => Ok(EnvFilter::new(default_log_filter())),
        })
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

/// Filter implied by repeated `-v` flags, if any were given
pub fn verbosity_filter(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("warn,sfdb_admin=info"),
        2 => Some("warn,sfdb_admin=debug"),
        _ => Some("debug,sfdb_admin=trace"),
    }
}

/// Get the default log filter based on build type
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "warn,sfdb_admin=debug,reqwest=warn,hyper=warn"
    }
    #[cfg(not(debug_assertions))]
    {
        "warn"
    }
}
