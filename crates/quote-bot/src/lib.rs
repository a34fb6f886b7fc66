//! Telegram quote bot
//!
//! A stateless webhook handler answering a handful of slash commands with
//! stock and crypto market data:
//!
//! - `/hello`, `/start` - greeting
//! - `/ytd <TICKER>` - year-to-date performance (Polygon.io)
//! - `/desc <TICKER>` - company description (Polygon.io)
//! - `/coin` - BTC, ETH, ADA, MATIC and SOL spot prices in USD and CAD (Coinbase)
//! - `/guide` - help
//!
//! # Architecture
//!
//! The webhook entry point ([`platforms::webhook`]) decodes the Telegram
//! update and hands the text to [`CommandRouter`], which parses a
//! [`Command`], calls a [`MarketData`] source and formats the reply with
//! [`TelegramFormatter`]. The reply travels back in the HTTP response as a
//! `sendMessage` call, so a chat user never sees a protocol-level error.
//!
//! # Example
//!
//! ```rust,ignore
//! use quote_bot::{BotConfig, build_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let app = build_app(&config)?;
//!     quote_bot::platforms::serve(&config.bind_addr, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod interface;
pub mod platforms;
pub mod quote;

use std::sync::Arc;

pub use api::{MarketData, MarketDataClient, TelegramClient};
pub use bot::{Command, CommandRouter};
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use interface::TelegramFormatter;

/// Wire the production market data client into the webhook app
pub fn build_app(config: &BotConfig) -> Result<axum::Router> {
    let market = Arc::new(MarketDataClient::new(config)?);
    Ok(build_app_with(config, market))
}

/// Webhook app over an arbitrary market data source
pub fn build_app_with(config: &BotConfig, market: Arc<dyn MarketData>) -> axum::Router {
    let router =
        CommandRouter::new(market, config.bot_name.clone()).with_username(config.username());
    platforms::build_webhook_app(router, &config.webhook_path, config.webhook_secret.clone())
}

/// Register `url` as the webhook and publish the command menu
pub async fn register_webhook(config: &BotConfig, url: &str) -> Result<()> {
    let telegram = TelegramClient::new(config)?;
    telegram
        .set_webhook(url, config.webhook_secret.as_deref())
        .await?;
    telegram.set_my_commands(&Command::menu()).await
}
