//! Polygon.io API client
//!
//! Ticker reference data and daily open/close bars, which are all the bot
//! needs for `/ytd` and `/desc`.

use super::RetryPolicy;
use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::quote::{CompanyDescription, YtdPerformance};
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

const PROVIDER: &str = "polygon";

/// Calendar days searched backwards for the latest trading day
const LAST_TRADING_DAY_LOOKBACK: u64 = 14;

/// Failed probes in a row after which a trading-day walk gives up
const MAX_CONSECUTIVE_PROBE_FAILURES: u32 = 5;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Polygon.io API client
#[derive(Debug, Clone)]
pub struct PolygonClient {
    client: Client,
    base_url: String,
    api_key: String,
    rate_limiter: SharedRateLimiter,
    retry: RetryPolicy,
    today: Option<NaiveDate>,
}

/// `results` object of the ticker reference endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TickerDetails {
    pub ticker: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    status: Option<String>,
    results: Option<TickerDetails>,
}

/// One day of the open/close endpoint
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DailyBar {
    pub open: f64,
    pub close: f64,
}

#[derive(Debug, Deserialize)]
struct OpenCloseResponse {
    status: Option<String>,
    open: Option<f64>,
    close: Option<f64>,
}

impl PolygonClient {
    /// Create a client from the bot configuration
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(
            NonZeroU32::new(config.polygon_rate_limit).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            client,
            base_url: config.polygon_base_url.clone(),
            api_key: config.polygon_api_key.clone(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            retry: RetryPolicy::from_config(config),
            today: None,
        })
    }

    /// Pin the date used as "today"
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Look up a ticker in the reference data
    ///
    /// Fails with `NotFound` when Polygon does not know the ticker.
    pub async fn ticker_details(&self, ticker: &str) -> Result<TickerDetails> {
        self.retry
            .run(PROVIDER, || self.fetch_ticker_details(ticker))
            .await
    }

    async fn fetch_ticker_details(&self, ticker: &str) -> Result<TickerDetails> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/v3/reference/tickers/{ticker}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_ticker_response(ticker, status, &body)
    }

    /// Fetch the open/close bar for a single day
    ///
    /// `Ok(None)` means the market has no data for that day.
    pub async fn daily_open_close(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyBar>> {
        self.retry
            .run(PROVIDER, || self.fetch_daily_open_close(ticker, date))
            .await
    }

    async fn fetch_daily_open_close(
        &self,
        ticker: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyBar>> {
        self.rate_limiter.until_ready().await;

        let url = format!(
            "{}/v1/open-close/{ticker}/{}",
            self.base_url,
            date.format("%Y-%m-%d")
        );
        let response = self
            .client
            .get(&url)
            .query(&[("adjusted", "true"), ("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_open_close_response(status, &body)
    }

    /// First day of the current year with a bar for `ticker`
    pub async fn first_trading_day(&self, ticker: &str) -> Result<(NaiveDate, DailyBar)> {
        self.find_trading_day(ticker, weekdays_forward(self.today()), "since January 1")
            .await
    }

    /// Most recent day with a bar for `ticker`
    pub async fn last_trading_day(&self, ticker: &str) -> Result<(NaiveDate, DailyBar)> {
        self.find_trading_day(
            ticker,
            weekdays_backward(self.today(), LAST_TRADING_DAY_LOOKBACK),
            "in the last two weeks",
        )
        .await
    }

    /// Probe `days` in order and return the first one with a bar
    ///
    /// A failed probe counts as a closed day. The walk only fails when it
    /// runs out of days or too many probes fail in a row.
    async fn find_trading_day<I>(
        &self,
        ticker: &str,
        days: I,
        window: &str,
    ) -> Result<(NaiveDate, DailyBar)>
    where
        I: Iterator<Item = NaiveDate>,
    {
        let mut consecutive_failures = 0;
        let mut last_error = None;

        for date in days {
            match self.daily_open_close(ticker, date).await {
                Ok(Some(bar)) => return Ok((date, bar)),
                Ok(None) => consecutive_failures = 0,
                Err(err) => {
                    tracing::warn!(
                        %ticker,
                        %date,
                        error = %err,
                        "Open/close probe failed, treating day as closed"
                    );
                    consecutive_failures += 1;
                    if consecutive_failures >= MAX_CONSECUTIVE_PROBE_FAILURES {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            BotError::Unexpected(format!("no trading day found for {ticker} {window}"))
        }))
    }

    /// Year-to-date performance: first-day open against latest close
    pub async fn year_to_date(&self, ticker: &str) -> Result<YtdPerformance> {
        let details = self.ticker_details(ticker).await?;

        let first = self.first_trading_day(&details.ticker).await?;
        let last = self.last_trading_day(&details.ticker).await?;

        tracing::debug!(
            ticker = %details.ticker,
            first_trading_day = %first.0,
            last_trading_day = %last.0,
            "Resolved YTD trading days"
        );

        ytd_from_bars(details.ticker, first, last)
    }

    /// Company name and business summary
    pub async fn describe(&self, ticker: &str) -> Result<CompanyDescription> {
        let details = self.ticker_details(ticker).await?;

        match details.description.filter(|d| !d.trim().is_empty()) {
            Some(description) => Ok(CompanyDescription {
                ticker: details.ticker,
                name: details.name,
                description,
            }),
            None => {
                tracing::warn!(ticker = %details.ticker, "Polygon returned no description");
                Err(BotError::NotFound(details.ticker))
            }
        }
    }
}

/// Performance from the first-day open to the latest close
fn ytd_from_bars(
    ticker: String,
    (first_trading_day, first_bar): (NaiveDate, DailyBar),
    (last_trading_day, last_bar): (NaiveDate, DailyBar),
) -> Result<YtdPerformance> {
    if first_bar.open == 0.0 {
        return Err(BotError::Unexpected(format!(
            "opening price of {ticker} on {first_trading_day} is zero"
        )));
    }

    Ok(YtdPerformance {
        ticker,
        first_trading_day,
        last_trading_day,
        year_start_price: first_bar.open,
        current_price: last_bar.close,
    })
}

fn parse_ticker_response(ticker: &str, status: StatusCode, body: &str) -> Result<TickerDetails> {
    if status == StatusCode::NOT_FOUND {
        return Err(BotError::NotFound(ticker.to_string()));
    }
    if !status.is_success() {
        return Err(BotError::from_status(PROVIDER, status));
    }

    let response: TickerResponse = serde_json::from_str(body)?;
    match (response.status.as_deref(), response.results) {
        (Some("NOT_FOUND"), _) | (_, None) => Err(BotError::NotFound(ticker.to_string())),
        (_, Some(details)) => Ok(details),
    }
}

fn parse_open_close_response(status: StatusCode, body: &str) -> Result<Option<DailyBar>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(BotError::from_status(PROVIDER, status));
    }

    let response: OpenCloseResponse = serde_json::from_str(body)?;
    if response.status.as_deref() == Some("NOT_FOUND") {
        return Ok(None);
    }

    match (response.open, response.close) {
        (Some(open), Some(close)) => Ok(Some(DailyBar { open, close })),
        _ => Ok(None),
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays from January 1 of `today`'s year up to and including `today`
fn weekdays_forward(today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let start = today.with_ordinal(1).unwrap_or(today);
    start
        .iter_days()
        .take_while(move |d| *d <= today)
        .filter(|d| !is_weekend(*d))
}

/// Weekdays from `today` backwards, covering `lookback` calendar days
fn weekdays_backward(today: NaiveDate, lookback: u64) -> impl Iterator<Item = NaiveDate> {
    (0..lookback)
        .filter_map(move |n| today.checked_sub_days(Days::new(n)))
        .filter(|d| !is_weekend(*d))
}
