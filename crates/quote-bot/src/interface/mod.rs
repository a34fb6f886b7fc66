//! Chat-facing presentation

pub mod formatter;

pub use formatter::{APOLOGY, TelegramFormatter, UNAVAILABLE, escape_html, format_money, format_percent};
