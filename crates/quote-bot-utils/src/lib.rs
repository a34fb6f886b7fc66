//! Shared utilities for quote-bot
//!
//! Logging setup and helpers for keeping credentials out of log lines.

pub mod logging;
pub mod secret;

pub use logging::{LogFormat, init_tracing, init_tracing_with};
pub use secret::mask_secret;
