//! Command parsing for chat messages

use crate::api::BotCommandSpec;
use crate::error::{BotError, Result};

const MAX_TICKER_LEN: usize = 10;

/// Parsed command from a chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Greeting (`/hello`, `/start`)
    Hello,
    /// Year-to-date performance of a stock
    Ytd { ticker: String },
    /// Crypto price snapshot
    Coin,
    /// Company description
    Desc { ticker: String },
    /// Show help
    Guide,
}

impl Command {
    /// Parse a command from message text
    ///
    /// Unknown keywords and plain text fail with `InvalidCommand`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let Some(body) = input.strip_prefix('/') else {
            return Err(BotError::InvalidCommand(input.to_string()));
        };

        let mut parts = body.split_whitespace();
        let keyword = parts.next().unwrap_or_default();
        // "/ytd@SomeBot" in group chats
        let keyword = keyword
            .split('@')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let args: Vec<&str> = parts.collect();

        match keyword.as_str() {
            "hello" | "start" => Ok(Command::Hello),
            "ytd" => Ok(Command::Ytd {
                ticker: single_ticker("/ytd", &args)?,
            }),
            "coin" => Ok(Command::Coin),
            "desc" => Ok(Command::Desc {
                ticker: single_ticker("/desc", &args)?,
            }),
            "guide" | "help" => Ok(Command::Guide),
            _ => Err(BotError::InvalidCommand(format!("/{keyword}"))),
        }
    }

    /// Whether `input` is meant for the bot called `username`
    ///
    /// `/ytd@OtherBot AAPL` in a group chat is for another bot. Commands
    /// without a mention, and plain text, are always for us.
    pub fn is_addressed_to(input: &str, username: &str) -> bool {
        let Some(body) = input.trim().strip_prefix('/') else {
            return true;
        };
        let keyword = body.split_whitespace().next().unwrap_or_default();

        match keyword.split_once('@') {
            Some((_, mention)) => mention.eq_ignore_ascii_case(username.trim_start_matches('@')),
            None => true,
        }
    }

    /// Keyword as typed by users
    pub fn name(&self) -> &'static str {
        match self {
            Command::Hello => "/hello",
            Command::Ytd { .. } => "/ytd",
            Command::Coin => "/coin",
            Command::Desc { .. } => "/desc",
            Command::Guide => "/guide",
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        "You can use the following commands:\n\
         /hello - Start talking to the bot\n\
         /ytd &lt;TICKER&gt; - Stock YTD performance (e.g., /ytd AAPL)\n\
         /coin - Latest crypto prices\n\
         /desc &lt;TICKER&gt; - Company summary (e.g., /desc TSLA)\n\
         /guide - Displays this help message"
    }

    /// Command menu registered with Telegram
    pub fn menu() -> Vec<BotCommandSpec> {
        [
            ("hello", "Start interaction with the bot"),
            ("ytd", "Calculates stock YTD performance (e.g., /ytd AAPL)"),
            ("coin", "Get latest crypto prices (BTC, ETH, etc.)"),
            ("desc", "Provides company summary (e.g., /desc TSLA)"),
            ("guide", "Get help and see available commands"),
        ]
        .into_iter()
        .map(|(command, description)| BotCommandSpec {
            command: command.to_string(),
            description: description.to_string(),
        })
        .collect()
    }
}

fn single_ticker(command: &'static str, args: &[&str]) -> Result<String> {
    match args {
        [] => Err(BotError::MissingArgument { command }),
        [ticker] => normalize_ticker(ticker),
        _ => Err(BotError::TooManyArguments { command }),
    }
}

/// Strip an optional `$` prefix and upper-case the ticker
///
/// Anything that cannot be a ticker is reported as not found.
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.strip_prefix('$').unwrap_or(raw).to_uppercase();

    let valid = !ticker.is_empty()
        && ticker.len() <= MAX_TICKER_LEN
        && ticker
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-');

    if valid {
        Ok(ticker)
    } else {
        Err(BotError::NotFound(raw.to_string()))
    }
}
