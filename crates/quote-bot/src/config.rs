//! Configuration for the bot process

use crate::error::{BotError, Result};
use quote_bot_utils::mask_secret;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";
pub const POLYGON_BASE_URL: &str = "https://api.polygon.io";
pub const COINBASE_BASE_URL: &str = "https://api.coinbase.com";
pub const TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org";

/// Configuration for the webhook bot
///
/// Both credentials are required; everything else has a default.
#[derive(Clone)]
pub struct BotConfig {
    /// Telegram bot token from BotFather
    pub telegram_token: String,

    /// Polygon.io API key
    pub polygon_api_key: String,

    /// Name used in the greeting
    pub bot_name: String,

    /// Telegram username, matched against `/command@username` in groups
    pub bot_username: Option<String>,

    /// Address the HTTP server listens on
    pub bind_addr: String,

    /// Route the platform posts updates to
    pub webhook_path: String,

    /// Public URL registered with Telegram (optional)
    pub webhook_url: Option<String>,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` header (optional)
    pub webhook_secret: Option<String>,

    /// Per-call timeout for outbound HTTP
    pub request_timeout: Duration,

    /// Attempts per price lookup
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Polygon requests allowed per minute
    pub polygon_rate_limit: u32,

    pub polygon_base_url: String,
    pub coinbase_base_url: String,
    pub telegram_api_base_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            polygon_api_key: String::new(),
            bot_name: "QuoteBot".to_string(),
            bot_username: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            webhook_url: None,
            webhook_secret: None,
            request_timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_backoff_base: Duration::from_millis(500),
            polygon_rate_limit: 100,
            polygon_base_url: POLYGON_BASE_URL.to_string(),
            coinbase_base_url: COINBASE_BASE_URL.to_string(),
            telegram_api_base_url: TELEGRAM_API_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &mask_secret(&self.telegram_token))
            .field("polygon_api_key", &mask_secret(&self.polygon_api_key))
            .field("bot_name", &self.bot_name)
            .field("bot_username", &self.bot_username)
            .field("bind_addr", &self.bind_addr)
            .field("webhook_path", &self.webhook_path)
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "***"))
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base", &self.retry_backoff_base)
            .field("polygon_rate_limit", &self.polygon_rate_limit)
            .field("polygon_base_url", &self.polygon_base_url)
            .field("coinbase_base_url", &self.coinbase_base_url)
            .field("telegram_api_base_url", &self.telegram_api_base_url)
            .finish()
    }
}

impl BotConfig {
    /// Create a new configuration builder
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder::default()
    }

    /// Username commands must carry in group chats, falling back to `bot_name`
    pub fn username(&self) -> &str {
        self.bot_username.as_deref().unwrap_or(&self.bot_name)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| BotError::Config(format!("{key} must be set")))
        };

        let mut builder = Self::builder()
            .telegram_token(required("TELEGRAM_TOKEN")?)
            .polygon_api_key(required("POLYGON_API_KEY")?);

        if let Some(name) = get("BOT_NAME") {
            builder = builder.bot_name(name);
        }
        if let Some(username) = get("BOT_USERNAME") {
            builder = builder.bot_username(username);
        }
        if let Some(addr) = get("BIND_ADDR") {
            builder = builder.bind_addr(addr);
        }
        if let Some(path) = get("WEBHOOK_PATH") {
            builder = builder.webhook_path(path);
        }
        if let Some(url) = get("TELEGRAM_WEBHOOK_URL") {
            builder = builder.webhook_url(url);
        }
        if let Some(secret) = get("TELEGRAM_WEBHOOK_SECRET") {
            builder = builder.webhook_secret(secret);
        }
        if let Some(secs) = get("REQUEST_TIMEOUT_SECS") {
            builder = builder.request_timeout(Duration::from_secs(parse_number(
                "REQUEST_TIMEOUT_SECS",
                &secs,
            )?));
        }
        if let Some(retries) = get("MAX_RETRIES") {
            builder = builder.max_retries(parse_number("MAX_RETRIES", &retries)?);
        }
        if let Some(limit) = get("POLYGON_RATE_LIMIT") {
            builder = builder.polygon_rate_limit(parse_number("POLYGON_RATE_LIMIT", &limit)?);
        }
        if let Some(url) = get("POLYGON_BASE_URL") {
            builder = builder.polygon_base_url(url);
        }
        if let Some(url) = get("COINBASE_BASE_URL") {
            builder = builder.coinbase_base_url(url);
        }
        if let Some(url) = get("TELEGRAM_API_BASE_URL") {
            builder = builder.telegram_api_base_url(url);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.telegram_token.is_empty() {
            return Err(BotError::Config("TELEGRAM_TOKEN must be set".to_string()));
        }

        if self.polygon_api_key.is_empty() {
            return Err(BotError::Config("POLYGON_API_KEY must be set".to_string()));
        }

        if self.max_retries == 0 {
            return Err(BotError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.polygon_rate_limit == 0 {
            return Err(BotError::Config(
                "polygon_rate_limit must be greater than 0".to_string(),
            ));
        }

        if !self.webhook_path.starts_with('/') {
            return Err(BotError::Config(format!(
                "webhook path must start with '/': {}",
                self.webhook_path
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(BotError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BotError::Config(format!("{key} must be a number, got '{value}'")))
}

/// Builder for BotConfig
#[derive(Debug, Default)]
pub struct BotConfigBuilder {
    telegram_token: Option<String>,
    polygon_api_key: Option<String>,
    bot_name: Option<String>,
    bot_username: Option<String>,
    bind_addr: Option<String>,
    webhook_path: Option<String>,
    webhook_url: Option<String>,
    webhook_secret: Option<String>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    polygon_rate_limit: Option<u32>,
    polygon_base_url: Option<String>,
    coinbase_base_url: Option<String>,
    telegram_api_base_url: Option<String>,
}

impl BotConfigBuilder {
    /// Set the Telegram bot token
    pub fn telegram_token(mut self, token: impl Into<String>) -> Self {
        self.telegram_token = Some(token.into());
        self
    }

    /// Set the Polygon API key
    pub fn polygon_api_key(mut self, key: impl Into<String>) -> Self {
        self.polygon_api_key = Some(key.into());
        self
    }

    /// Set the name used in greetings
    pub fn bot_name(mut self, name: impl Into<String>) -> Self {
        self.bot_name = Some(name.into());
        self
    }

    /// Set the Telegram username, with or without the leading `@`
    pub fn bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Set the listen address
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    /// Set the webhook route
    pub fn webhook_path(mut self, path: impl Into<String>) -> Self {
        self.webhook_path = Some(path.into());
        self
    }

    /// Set the public webhook URL to register
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Set the webhook secret token
    pub fn webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set Polygon requests per minute
    pub fn polygon_rate_limit(mut self, limit: u32) -> Self {
        self.polygon_rate_limit = Some(limit);
        self
    }

    pub fn polygon_base_url(mut self, url: impl Into<String>) -> Self {
        self.polygon_base_url = Some(url.into());
        self
    }

    pub fn coinbase_base_url(mut self, url: impl Into<String>) -> Self {
        self.coinbase_base_url = Some(url.into());
        self
    }

    pub fn telegram_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.telegram_api_base_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BotConfig> {
        let defaults = BotConfig::default();

        let config = BotConfig {
            telegram_token: self.telegram_token.unwrap_or(defaults.telegram_token),
            polygon_api_key: self.polygon_api_key.unwrap_or(defaults.polygon_api_key),
            bot_name: self.bot_name.unwrap_or(defaults.bot_name),
            bot_username: self
                .bot_username
                .map(|u| u.trim().trim_start_matches('@').to_string()),
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            webhook_path: self.webhook_path.unwrap_or(defaults.webhook_path),
            webhook_url: self.webhook_url,
            webhook_secret: self.webhook_secret,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            polygon_rate_limit: self.polygon_rate_limit.unwrap_or(defaults.polygon_rate_limit),
            polygon_base_url: trim_base(self.polygon_base_url.unwrap_or(defaults.polygon_base_url)),
            coinbase_base_url: trim_base(
                self.coinbase_base_url.unwrap_or(defaults.coinbase_base_url),
            ),
            telegram_api_base_url: trim_base(
                self.telegram_api_base_url
                    .unwrap_or(defaults.telegram_api_base_url),
            ),
        };

        config.validate()?;
        Ok(config)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
