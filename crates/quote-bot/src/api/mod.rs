//! API clients for market data and the Telegram Bot API

pub mod coinbase;
pub mod market;
pub mod polygon;
pub mod retry;
pub mod telegram;

pub use coinbase::CoinbaseClient;
pub use market::MarketDataClient;
pub use polygon::PolygonClient;
pub use retry::RetryPolicy;
pub use telegram::{BotCommandSpec, TelegramClient};

use crate::error::Result;
use crate::quote::{CompanyDescription, CryptoSnapshot, YtdPerformance};
use async_trait::async_trait;

/// Market data needed by the command handlers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Year-to-date performance of a stock ticker
    async fn year_to_date(&self, ticker: &str) -> Result<YtdPerformance>;

    /// Business summary of a stock ticker
    async fn describe(&self, ticker: &str) -> Result<CompanyDescription>;

    /// Spot prices of the configured crypto assets
    async fn crypto_snapshot(&self) -> Result<CryptoSnapshot>;
}
