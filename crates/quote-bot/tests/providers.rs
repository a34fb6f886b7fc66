#![allow(missing_docs)]

//! HTTP clients against local fake Polygon, Coinbase and Telegram servers

mod common;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use common::{post_update, spawn_server};
use quote_bot::api::{CoinbaseClient, PolygonClient};
use quote_bot::quote::Fiat;
use quote_bot::{BotConfig, BotError, MarketData, MarketDataClient, build_app_with};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const API_KEY: &str = "test-polygon-key";
const TOKEN: &str = "123456789:ABCdefGHIjklMNOpqrsTUVwxyz";

#[derive(Default)]
struct FakeState {
    flaky_failures: AtomicUsize,
    ticker_requests: AtomicUsize,
    eth_cad_requests: AtomicUsize,
    telegram_calls: Mutex<Vec<(String, String, Value)>>,
}

type Shared = Arc<FakeState>;

async fn ticker_details(
    State(state): State<Shared>,
    Path(ticker): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.ticker_requests.fetch_add(1, Ordering::SeqCst);
    if query.get("apiKey").map(String::as_str) != Some(API_KEY) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"status": "ERROR"}))).into_response();
    }

    match ticker.as_str() {
        "AAPL" => Json(json!({
            "status": "OK",
            "results": {
                "ticker": "AAPL",
                "name": "Apple Inc.",
                "description": "Apple designs smartphones & computers."
            }
        }))
        .into_response(),
        "SLOW" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({"status": "OK", "results": {"ticker": "SLOW"}})).into_response()
        }
        "SHAKY" | "ZERO" => Json(json!({
            "status": "OK",
            "results": {"ticker": ticker, "description": "Test listing."}
        }))
        .into_response(),
        "NODESC" => Json(json!({
            "status": "OK",
            "results": {"ticker": "NODESC", "name": "Quiet Corp"}
        }))
        .into_response(),
        "FLAKY" => {
            if state.flaky_failures.fetch_add(1, Ordering::SeqCst) == 0 {
                return StatusCode::BAD_GATEWAY.into_response();
            }
            Json(json!({
                "status": "OK",
                "results": {"ticker": "FLAKY", "description": "Sometimes there."}
            }))
            .into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "NOT_FOUND", "message": "Ticker not found."})),
        )
            .into_response(),
    }
}

/// Bars for early January 2026. Jan 1 is a holiday and the plan cannot read
/// the bar for Jan 9, the pinned "today".
async fn open_close(Path((ticker, date)): Path<(String, String)>) -> Response {
    if date == "2026-01-09" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"status": "NOT_AUTHORIZED", "message": "Upgrade your plan."})),
        )
            .into_response();
    }
    if ticker == "SHAKY" && date == "2026-01-01" {
        return StatusCode::BAD_GATEWAY.into_response();
    }

    let bar = match date.as_str() {
        "2026-01-02" if ticker == "ZERO" => Some((0.0, 1.0)),
        "2026-01-02" => Some((100.0, 101.0)),
        "2026-01-05" => Some((101.0, 104.0)),
        "2026-01-08" => Some((110.0, 112.5)),
        _ => None,
    };

    match bar {
        Some((open, close)) => Json(json!({
            "status": "OK",
            "from": date,
            "open": open,
            "close": close
        }))
        .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"status": "NOT_FOUND"}))).into_response(),
    }
}

async fn spot(State(state): State<Shared>, Path(pair): Path<String>) -> Response {
    if pair == "MATIC-CAD" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if pair == "ETH-CAD" && state.eth_cad_requests.fetch_add(1, Ordering::SeqCst) == 0 {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    let Some((base, currency)) = pair.split_once('-') else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let amount = match base {
        "BTC" => "65000.5",
        "ETH" => "3200.25",
        _ => "1.5",
    };
    Json(json!({"data": {"base": base, "currency": currency, "amount": amount}})).into_response()
}

async fn telegram_method(
    State(state): State<Shared>,
    Path((bot_path, method)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Json<Value> {
    if let Ok(mut calls) = state.telegram_calls.lock() {
        calls.push((bot_path, method, body));
    }
    Json(json!({"ok": true, "result": true}))
}

async fn spawn_fakes() -> Result<(Shared, String)> {
    let state = Shared::default();
    let app = Router::new()
        .route("/v3/reference/tickers/{ticker}", get(ticker_details))
        .route("/v1/open-close/{ticker}/{date}", get(open_close))
        .route("/v2/prices/{pair}/spot", get(spot))
        .route("/{bot_path}/{method}", post(telegram_method))
        .with_state(state.clone());
    Ok((state, spawn_server(app).await?))
}

fn config(base_url: &str) -> Result<BotConfig> {
    config_with_timeout(base_url, Duration::from_secs(2))
}

fn config_with_timeout(base_url: &str, timeout: Duration) -> Result<BotConfig> {
    Ok(BotConfig::builder()
        .telegram_token(TOKEN)
        .polygon_api_key(API_KEY)
        .polygon_base_url(format!("{base_url}/"))
        .coinbase_base_url(base_url)
        .telegram_api_base_url(base_url)
        .request_timeout(timeout)
        .retry_backoff_base(Duration::from_millis(1))
        .max_retries(3)
        .build()?)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 9).expect("valid date")
}

fn market(config: &BotConfig) -> Result<MarketDataClient> {
    Ok(MarketDataClient::from_parts(
        PolygonClient::new(config)?.with_today(today()),
        CoinbaseClient::new(config)?,
    ))
}

#[tokio::test]
async fn year_to_date_uses_first_open_and_latest_close() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    let ytd = market.year_to_date("AAPL").await?;
    assert_eq!(ytd.first_trading_day, NaiveDate::from_ymd_opt(2026, 1, 2).expect("valid date"));
    assert_eq!(ytd.last_trading_day, NaiveDate::from_ymd_opt(2026, 1, 8).expect("valid date"));
    assert!((ytd.year_start_price - 100.0).abs() < f64::EPSILON);
    assert!((ytd.current_price - 112.5).abs() < f64::EPSILON);
    assert!((ytd.percent_change() - 12.5).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn unknown_ticker_is_not_found() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    let err = market.year_to_date("BADTICKER").await.unwrap_err();
    assert!(matches!(err, BotError::NotFound(ref t) if t == "BADTICKER"), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn describe_returns_name_and_summary() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    let desc = market.describe("AAPL").await?;
    assert_eq!(desc.name.as_deref(), Some("Apple Inc."));
    assert!(desc.description.starts_with("Apple designs"));

    let err = market.describe("NODESC").await.unwrap_err();
    assert!(matches!(err, BotError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn transient_polygon_failure_is_retried() -> Result<()> {
    let (state, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    let desc = market.describe("FLAKY").await?;
    assert_eq!(desc.ticker, "FLAKY");
    assert_eq!(state.flaky_failures.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn not_found_is_not_retried() -> Result<()> {
    let (state, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    assert!(market.describe("ZZZZ").await.is_err());
    assert_eq!(state.ticker_requests.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn unreadable_days_are_skipped_during_the_walk() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    // today answers 403 and Jan 1 answers 502; both count as closed days
    let ytd = market.year_to_date("SHAKY").await?;
    assert_eq!(ytd.first_trading_day, NaiveDate::from_ymd_opt(2026, 1, 2).expect("valid date"));
    assert_eq!(ytd.last_trading_day, NaiveDate::from_ymd_opt(2026, 1, 8).expect("valid date"));
    assert!((ytd.percent_change() - 12.5).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn zero_opening_price_is_unexpected() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let config = config(&base)?;
    let market = market(&config)?;

    let err = market.year_to_date("ZERO").await.unwrap_err();
    assert!(matches!(err, BotError::Unexpected(_)), "{err:?}");

    let app = build_app_with(&config, Arc::new(market));
    let (status, body) = post_update(app, "/ytd ZERO").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], quote_bot::interface::APOLOGY);
    Ok(())
}

#[tokio::test]
async fn slow_provider_times_out_as_unavailable() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let config = config_with_timeout(&base, Duration::from_millis(100))?;
    let market = market(&config)?;

    let err = market.describe("SLOW").await.unwrap_err();
    let timed_out = matches!(
        err,
        BotError::ServiceUnavailable { ref reason, .. } if reason == "request timed out"
    );
    assert!(timed_out, "{err:?}");

    let app = build_app_with(&config, Arc::new(market));
    let (status, body) = post_update(app, "/desc SLOW").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], quote_bot::interface::UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn wrong_api_key_is_rejected_without_retry() -> Result<()> {
    let (state, base) = spawn_fakes().await?;
    let mut config = config(&base)?;
    config.polygon_api_key = "wrong".to_string();
    let market = market(&config)?;

    let err = market.year_to_date("AAPL").await.unwrap_err();
    assert!(matches!(err, BotError::ProviderRejected { provider: "polygon", .. }));
    assert_eq!(state.ticker_requests.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn crypto_snapshot_annotates_failed_pairs() -> Result<()> {
    let (state, base) = spawn_fakes().await?;
    let market = market(&config(&base)?)?;

    let snapshot = market.crypto_snapshot().await?;
    assert_eq!(snapshot.prices.len(), 10);
    assert_eq!(snapshot.degraded(), 1);
    assert_eq!(snapshot.available(), 9);

    let first = &snapshot.prices[0];
    assert_eq!(first.pair(), "BTC-USD");
    assert_eq!(first.fiat, Fiat::Usd);
    assert!(matches!(first.outcome, Ok(amount) if (amount - 65_000.5).abs() < 1e-9));

    let matic_cad = snapshot
        .prices
        .iter()
        .find(|p| p.pair() == "MATIC-CAD")
        .map(|p| p.is_available());
    assert_eq!(matic_cad, Some(false));

    // ETH-CAD failed once and was retried
    assert_eq!(state.eth_cad_requests.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn crypto_snapshot_fails_when_provider_is_down() -> Result<()> {
    // nothing listens on the discard port
    let config = config("http://127.0.0.1:9")?;
    let market = market(&config)?;

    let err = market.crypto_snapshot().await.unwrap_err();
    assert!(err.is_transient());
    Ok(())
}

#[tokio::test]
async fn webhook_replies_with_live_quotes() -> Result<()> {
    let (_, base) = spawn_fakes().await?;
    let config = config(&base)?;
    let app = build_app_with(&config, Arc::new(market(&config)?));

    let (status, body) = post_update(app.clone(), "/ytd $aapl").await?;
    assert_eq!(status, StatusCode::OK);
    let text = body["text"].as_str().unwrap_or_default();
    assert!(text.contains("+12.50%"), "{text}");
    assert!(text.contains("https://robinhood.com/stocks/AAPL"));

    let (_, body) = post_update(app.clone(), "/coin").await?;
    let text = body["text"].as_str().unwrap_or_default();
    assert!(text.contains("1 Bitcoin is $65,000.50 in"), "{text}");
    assert!(text.contains("data unavailable"));

    let (_, body) = post_update(app, "/desc AAPL").await?;
    let text = body["text"].as_str().unwrap_or_default();
    assert!(text.contains("smartphones &amp; computers"), "{text}");
    Ok(())
}

#[tokio::test]
async fn register_webhook_sets_url_and_menu() -> Result<()> {
    let (state, base) = spawn_fakes().await?;
    let config = config(&base)?;

    quote_bot::register_webhook(&config, "https://bot.example.com/webhook").await?;

    let calls = state
        .telegram_calls
        .lock()
        .map(|calls| calls.clone())
        .unwrap_or_default();
    assert_eq!(calls.len(), 2);

    let (bot_path, method, body) = &calls[0];
    assert_eq!(bot_path, &format!("bot{TOKEN}"));
    assert_eq!(method, "setWebhook");
    assert_eq!(body["url"], "https://bot.example.com/webhook");

    let (_, method, body) = &calls[1];
    assert_eq!(method, "setMyCommands");
    let commands: Vec<&str> = body["commands"]
        .as_array()
        .map(|list| list.iter().filter_map(|c| c["command"].as_str()).collect())
        .unwrap_or_default();
    assert!(commands.contains(&"ytd"));
    assert!(commands.contains(&"coin"));
    Ok(())
}
