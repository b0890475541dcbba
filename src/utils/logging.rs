//! Structured logging setup.
//!
//! Builds a `tracing-subscriber` fmt subscriber from [`LoggingConfig`].
//! The `RUST_LOG` environment variable, when set, overrides the configured
//! level.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string().to_ascii_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    // Err means a subscriber is already installed, e.g. by the test harness.
    let _ = result;
}
