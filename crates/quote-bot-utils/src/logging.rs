//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line output
    #[default]
    Pretty,
    /// One JSON object per line, for log collectors
    Json,
}

impl LogFormat {
    /// Read the format from `LOG_FORMAT` (`json` selects JSON, anything else is pretty)
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::Pretty,
        }
    }

    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Initialize tracing subscriber with default configuration
///
/// The filter comes from `RUST_LOG` and falls back to `info`; the output
/// format comes from `LOG_FORMAT`.
pub fn init_tracing() {
    init_tracing_with("info", LogFormat::from_env());
}

/// Initialize tracing subscriber with an explicit fallback filter and format
pub fn init_tracing_with(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
