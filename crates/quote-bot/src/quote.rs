//! Quote result value objects
//!
//! Produced by the market data clients once per request and consumed by the
//! formatter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Crypto assets quoted by `/coin`, as (symbol, display name)
pub const CRYPTO_ASSETS: [(&str, &str); 5] = [
    ("BTC", "Bitcoin"),
    ("ETH", "Ethereum"),
    ("ADA", "Cardano"),
    ("MATIC", "Polygon"),
    ("SOL", "Solana"),
];

/// Fiat currencies crypto prices are quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fiat {
    Usd,
    Cad,
}

impl Fiat {
    /// Quote order used by `/coin`
    pub const ALL: [Fiat; 2] = [Fiat::Usd, Fiat::Cad];

    /// ISO 4217 code
    pub fn code(self) -> &'static str {
        match self {
            Fiat::Usd => "USD",
            Fiat::Cad => "CAD",
        }
    }

    /// Currency symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Fiat::Usd => "$",
            Fiat::Cad => "C$",
        }
    }

    /// Country flag
    pub fn flag(self) -> &'static str {
        match self {
            Fiat::Usd => "🇺🇸",
            Fiat::Cad => "🇨🇦",
        }
    }
}

impl fmt::Display for Fiat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Year-to-date performance of a stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YtdPerformance {
    pub ticker: String,
    pub first_trading_day: NaiveDate,
    pub last_trading_day: NaiveDate,
    /// Opening price on the first trading day of the year
    pub year_start_price: f64,
    /// Closing price on the most recent trading day
    pub current_price: f64,
}

impl YtdPerformance {
    /// Percentage change from the year-start price to the current price
    pub fn percent_change(&self) -> f64 {
        (self.current_price - self.year_start_price) / self.year_start_price * 100.0
    }
}

/// Business summary of a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDescription {
    pub ticker: String,
    pub name: Option<String>,
    pub description: String,
}

/// Spot price of one crypto/fiat pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoPrice {
    pub symbol: String,
    pub name: String,
    pub fiat: Fiat,
    /// Price, or the reason the lookup failed
    pub outcome: std::result::Result<f64, String>,
}

impl CryptoPrice {
    /// Coinbase-style pair name, e.g. `BTC-USD`
    pub fn pair(&self) -> String {
        format!("{}-{}", self.symbol, self.fiat.code())
    }

    pub fn is_available(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Prices for every configured pair, in display order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CryptoSnapshot {
    pub prices: Vec<CryptoPrice>,
}

impl CryptoSnapshot {
    pub fn available(&self) -> usize {
        self.prices.iter().filter(|p| p.is_available()).count()
    }

    pub fn degraded(&self) -> usize {
        self.prices.len() - self.available()
    }
}
