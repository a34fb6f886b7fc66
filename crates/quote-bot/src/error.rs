//! Error types for bot operations

use reqwest::StatusCode;
use thiserror::Error;

/// Bot specific errors
#[derive(Debug, Error)]
pub enum BotError {
    /// Command keyword is not one the bot knows
    #[error("Unknown command: {0}")]
    InvalidCommand(String),

    /// Command needs an argument that was not supplied
    #[error("Missing argument for {command}")]
    MissingArgument {
        command: &'static str,
    },

    /// Command takes a single argument but received more
    #[error("{command} only supports 1 ticker symbol at a time")]
    TooManyArguments {
        command: &'static str,
    },

    /// Ticker or symbol unknown to the provider
    #[error("Ticker symbol '{0}' not found")]
    NotFound(String),

    /// Provider unreachable, timed out, or answered with an error
    #[error("Service unavailable ({provider}): {reason}")]
    ServiceUnavailable {
        provider: &'static str,
        reason: String,
    },

    /// Provider refused the request (bad key, plan limits); retrying will not help
    #[error("Request rejected ({provider}): {reason}")]
    ProviderRejected {
        provider: &'static str,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anything else
    #[error("{0}")]
    Unexpected(String),
}

impl BotError {
    pub(crate) fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    /// Error for a non-success HTTP status other than 404
    ///
    /// 429 and 5xx are worth retrying, any other 4xx is final.
    pub(crate) fn from_status(provider: &'static str, status: StatusCode) -> Self {
        let reason = format!("HTTP {status}");
        if status == StatusCode::TOO_MANY_REQUESTS || !status.is_client_error() {
            Self::unavailable(provider, reason)
        } else {
            Self::ProviderRejected { provider, reason }
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.without_url().to_string()
        };
        BotError::unavailable("http", reason)
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::unavailable("json", err.to_string())
    }
}
