//! Production [`MarketData`] backed by Polygon (stocks) and Coinbase (crypto)

use super::{CoinbaseClient, MarketData, PolygonClient};
use crate::config::BotConfig;
use crate::error::Result;
use crate::quote::{CompanyDescription, CryptoSnapshot, YtdPerformance};
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct MarketDataClient {
    polygon: PolygonClient,
    coinbase: CoinbaseClient,
}

impl MarketDataClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        Ok(Self {
            polygon: PolygonClient::new(config)?,
            coinbase: CoinbaseClient::new(config)?,
        })
    }

    pub fn from_parts(polygon: PolygonClient, coinbase: CoinbaseClient) -> Self {
        Self { polygon, coinbase }
    }
}

#[async_trait]
impl MarketData for MarketDataClient {
    async fn year_to_date(&self, ticker: &str) -> Result<YtdPerformance> {
        self.polygon.year_to_date(ticker).await
    }

    async fn describe(&self, ticker: &str) -> Result<CompanyDescription> {
        self.polygon.describe(ticker).await
    }

    async fn crypto_snapshot(&self) -> Result<CryptoSnapshot> {
        self.coinbase.snapshot().await
    }
}
