//! Coinbase spot price client

use super::RetryPolicy;
use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::quote::{CRYPTO_ASSETS, CryptoPrice, CryptoSnapshot, Fiat};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const PROVIDER: &str = "coinbase";

/// Coinbase public price API client
#[derive(Debug, Clone)]
pub struct CoinbaseClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct SpotResponse {
    data: Option<SpotPrice>,
}

#[derive(Debug, Deserialize)]
struct SpotPrice {
    currency: Option<String>,
    amount: Option<String>,
}

impl CoinbaseClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.coinbase_base_url.clone(),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Current spot price of `symbol` in `fiat`
    pub async fn spot_price(&self, symbol: &str, fiat: Fiat) -> Result<f64> {
        self.retry
            .run(PROVIDER, || self.fetch_spot_price(symbol, fiat))
            .await
    }

    async fn fetch_spot_price(&self, symbol: &str, fiat: Fiat) -> Result<f64> {
        let url = format!("{}/v2/prices/{symbol}-{}/spot", self.base_url, fiat.code());
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        parse_spot_response(symbol, fiat, status, &body)
    }

    /// Prices for every configured asset in both fiats
    ///
    /// Pairs that fail keep their slot with the failure reason. The whole
    /// call fails only when no pair could be priced.
    pub async fn snapshot(&self) -> Result<CryptoSnapshot> {
        let pairs: Vec<(&str, &str, Fiat)> = Fiat::ALL
            .iter()
            .flat_map(|fiat| CRYPTO_ASSETS.iter().map(move |(s, n)| (*s, *n, *fiat)))
            .collect();

        let lookups = pairs.iter().map(|(symbol, _, fiat)| self.spot_price(symbol, *fiat));
        let results = join_all(lookups).await;

        let prices: Vec<CryptoPrice> = pairs
            .into_iter()
            .zip(results)
            .map(|((symbol, name, fiat), result)| {
                let outcome = result.map_err(|err| {
                    tracing::warn!(
                        pair = %format!("{symbol}-{fiat}"),
                        error = %err,
                        "Spot price lookup failed"
                    );
                    err.to_string()
                });
                CryptoPrice {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    fiat,
                    outcome,
                }
            })
            .collect();

        let snapshot = CryptoSnapshot { prices };
        if snapshot.available() == 0 {
            return Err(BotError::unavailable(
                PROVIDER,
                "no crypto prices could be retrieved",
            ));
        }

        Ok(snapshot)
    }
}

fn parse_spot_response(symbol: &str, fiat: Fiat, status: StatusCode, body: &str) -> Result<f64> {
    if status == StatusCode::NOT_FOUND {
        return Err(BotError::NotFound(format!("{symbol}-{fiat}")));
    }
    if !status.is_success() {
        return Err(BotError::from_status(PROVIDER, status));
    }

    let response: SpotResponse = serde_json::from_str(body)?;
    let price = response
        .data
        .ok_or_else(|| BotError::unavailable(PROVIDER, "response has no data field"))?;

    match price.currency.as_deref() {
        Some(currency) if currency != fiat.code() => {
            return Err(BotError::unavailable(
                PROVIDER,
                format!("expected {fiat} price, got {currency}"),
            ));
        }
        _ => {}
    }

    let amount = price
        .amount
        .ok_or_else(|| BotError::unavailable(PROVIDER, "response has no amount"))?
        .parse::<f64>()
        .map_err(|_| BotError::unavailable(PROVIDER, "amount is not a number"))?;

    if !amount.is_finite() {
        return Err(BotError::unavailable(PROVIDER, "amount is not a finite number"));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spot_price() {
        let body = r#"{"data":{"base":"BTC","currency":"USD","amount":"65123.45"}}"#;
        let amount = parse_spot_response("BTC", Fiat::Usd, StatusCode::OK, body).unwrap();
        assert!((amount - 65_123.45).abs() < 1e-9);
    }

    #[test]
    fn test_parse_spot_rejects_bad_payloads() {
        let cases = [
            r#"{"data":{"base":"BTC","currency":"USD","amount":"abc"}}"#,
            r#"{"data":{"base":"BTC","currency":"USD"}}"#,
            r#"{"data":{"base":"BTC","currency":"EUR","amount":"1.0"}}"#,
            r#"{"data":{"base":"BTC","currency":"USD","amount":"NaN"}}"#,
            r#"{"data":{"base":"BTC","currency":"USD","amount":"inf"}}"#,
            r#"{"errors":[]}"#,
            "not json",
        ];
        for body in cases {
            let result = parse_spot_response("BTC", Fiat::Usd, StatusCode::OK, body);
            assert!(
                matches!(result, Err(BotError::ServiceUnavailable { .. })),
                "body {body} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_parse_spot_http_errors() {
        assert!(matches!(
            parse_spot_response("XYZ", Fiat::Cad, StatusCode::NOT_FOUND, "{}"),
            Err(BotError::NotFound(pair)) if pair == "XYZ-CAD"
        ));
        assert!(matches!(
            parse_spot_response("BTC", Fiat::Cad, StatusCode::BAD_GATEWAY, ""),
            Err(BotError::ServiceUnavailable { .. })
        ));
        assert!(matches!(
            parse_spot_response("BTC", Fiat::Usd, StatusCode::FORBIDDEN, ""),
            Err(BotError::ProviderRejected { .. })
        ));
    }
}
