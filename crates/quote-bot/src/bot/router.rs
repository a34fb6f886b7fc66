//! Routes parsed commands to handlers and always produces a reply

use super::Command;
use crate::api::MarketData;
use crate::error::{BotError, Result};
use crate::interface::TelegramFormatter;
use std::sync::Arc;

/// Dispatches chat messages to command handlers
#[derive(Clone)]
pub struct CommandRouter {
    market: Arc<dyn MarketData>,
    formatter: TelegramFormatter,
    bot_name: String,
    username: String,
}

impl CommandRouter {
    pub fn new(market: Arc<dyn MarketData>, bot_name: impl Into<String>) -> Self {
        let bot_name = bot_name.into();
        Self {
            market,
            formatter: TelegramFormatter,
            username: bot_name.clone(),
            bot_name,
        }
    }

    /// Username that `/command@username` mentions must match
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Whether a message is for this bot rather than another one in the chat
    pub fn is_addressed(&self, text: &str) -> bool {
        Command::is_addressed_to(text, &self.username)
    }

    /// Reply text for one chat message
    ///
    /// Every failure is turned into user-facing text here.
    pub async fn handle(&self, text: &str, sender: Option<&str>) -> String {
        let result = match Command::parse(text) {
            Ok(command) => {
                tracing::info!(command = command.name(), "Dispatching command");
                self.execute(&command, sender).await
            }
            Err(err) => Err(err),
        };

        result.unwrap_or_else(|err| {
            log_failure(&err);
            self.formatter.format_error(&err)
        })
    }

    /// Execute a parsed command
    pub async fn execute(&self, command: &Command, sender: Option<&str>) -> Result<String> {
        match command {
            Command::Hello => Ok(self.formatter.format_greeting(sender, &self.bot_name)),
            Command::Guide => Ok(self.formatter.format_help()),
            Command::Ytd { ticker } => {
                let ytd = self.market.year_to_date(ticker).await?;
                Ok(self.formatter.format_ytd(&ytd))
            }
            Command::Desc { ticker } => {
                let desc = self.market.describe(ticker).await?;
                Ok(self.formatter.format_description(&desc))
            }
            Command::Coin => {
                let snapshot = self.market.crypto_snapshot().await?;
                if snapshot.degraded() > 0 {
                    tracing::warn!(
                        degraded = snapshot.degraded(),
                        total = snapshot.prices.len(),
                        "Crypto snapshot is partial"
                    );
                }
                Ok(self.formatter.format_crypto(&snapshot))
            }
        }
    }
}

fn log_failure(err: &BotError) {
    match err {
        BotError::InvalidCommand(cmd) => {
            tracing::info!(%cmd, "Unrecognized command, sending guide");
        }
        BotError::MissingArgument { .. } | BotError::TooManyArguments { .. } => {
            tracing::info!(error = %err, "Command usage error");
        }
        BotError::NotFound(_) | BotError::ServiceUnavailable { .. } => {
            tracing::warn!(error = %err, "Command failed");
        }
        BotError::ProviderRejected { .. } | BotError::Config(_) | BotError::Unexpected(_) => {
            tracing::error!(error = %err, "Unexpected failure while handling command");
        }
    }
}
