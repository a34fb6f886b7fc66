//! Telegram Bot API client
//!
//! Only the calls needed to register the bot: replies go back inside the
//! webhook response instead of through `sendMessage`.

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "telegram";

/// Entry of the command menu shown by Telegram clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotCommandSpec {
    pub command: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

#[derive(Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: [&'a str; 1],
}

#[derive(Serialize)]
struct SetMyCommandsRequest<'a> {
    commands: &'a [BotCommandSpec],
}

/// Telegram Bot API client
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: format!("{}/bot{}", config.telegram_api_base_url, config.telegram_token),
        })
    }

    /// Point Telegram at the public webhook URL
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let request = SetWebhookRequest {
            url,
            secret_token,
            allowed_updates: ["message"],
        };
        self.call("setWebhook", &request).await?;
        tracing::info!(%url, "Telegram webhook registered");
        Ok(())
    }

    /// Publish the command menu
    pub async fn set_my_commands(&self, commands: &[BotCommandSpec]) -> Result<()> {
        self.call("setMyCommands", &SetMyCommandsRequest { commands })
            .await?;
        tracing::info!(count = commands.len(), "Telegram command menu updated");
        Ok(())
    }

    async fn call<B: Serialize + Sync>(&self, method: &str, body: &B) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{method}", self.api_base))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let api: ApiResponse = response.json().await?;
        if api.ok {
            Ok(())
        } else {
            Err(BotError::unavailable(
                PROVIDER,
                format!(
                    "{method} failed with HTTP {status}: {}",
                    api.description.unwrap_or_default()
                ),
            ))
        }
    }
}
