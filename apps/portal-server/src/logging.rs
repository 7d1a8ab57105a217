//! JSON log output for the portal server.

use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Filter used when `RUST_LOG` is unset or cannot be parsed.
pub const DEFAULT_LOG_FILTER: &str = "info,portal=debug,sqlx=warn";

/// Parse `filter`, falling back to [`DEFAULT_LOG_FILTER`].
fn filter_or_default(filter: &str) -> (EnvFilter, Option<ParseError>) {
    match EnvFilter::try_new(filter) {
        Ok(parsed) => (parsed, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e)),
    }
}

/// Install the global subscriber: one flattened JSON object per event,
/// with source file and line.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(filter: &str) {
    let (filter_layer, rejected) = filter_or_default(filter);

    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    if let Some(e) = rejected {
        tracing::warn!(filter = %filter, error = %e, "Invalid log filter, using default");
    }
    tracing::info!(
        service = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );
}

/// Plain-text logging captured by the test harness.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_is_kept() {
        let (filter, rejected) = filter_or_default("warn,portal_api=trace");
        assert!(rejected.is_none());
        assert!(filter.to_string().contains("portal_api=trace"));
    }

    #[test]
    fn test_invalid_filter_falls_back() {
        let (filter, rejected) = filter_or_default("portal_api=[");
        assert!(rejected.is_some());
        assert!(filter.to_string().contains("sqlx=warn"));
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
