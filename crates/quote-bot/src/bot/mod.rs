//! Command parsing and dispatch
//!
//! [`Command::parse`] turns message text into a closed set of commands and
//! [`CommandRouter`] runs them against a [`MarketData`](crate::api::MarketData)
//! source, converting every failure into reply text.

pub mod commands;
pub mod router;

pub use commands::{Command, normalize_ticker};
pub use router::CommandRouter;
