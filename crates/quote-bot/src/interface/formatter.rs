//! Response formatting for Telegram HTML parse mode

use crate::bot::Command;
use crate::error::BotError;
use crate::quote::{CompanyDescription, CryptoPrice, CryptoSnapshot, Fiat, YtdPerformance};

pub const APOLOGY: &str = "Sorry, something went wrong. Please try again later.";
pub const UNAVAILABLE: &str =
    "The market data service is unavailable right now. Please try again later.";

/// Turns quote results and errors into chat text
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramFormatter;

impl TelegramFormatter {
    pub fn format_greeting(&self, sender: Option<&str>, bot_name: &str) -> String {
        let sender = sender.map_or_else(|| "there".to_string(), escape_html);
        format!(
            "Hello {sender}, \nI am {}, your assistant for stock and crypto info!\n\n{}",
            escape_html(bot_name),
            self.format_help()
        )
    }

    pub fn format_help(&self) -> String {
        Command::help_text().to_string()
    }

    pub fn format_ytd(&self, ytd: &YtdPerformance) -> String {
        let change = round2(ytd.percent_change());
        let arrow = if change > 0.0 {
            "⬆️"
        } else if change < 0.0 {
            "⬇️"
        } else {
            "➡️"
        };
        let ticker = escape_html(&ytd.ticker);

        format!(
            "<a href=\"https://robinhood.com/stocks/{ticker}\">{ticker}</a> is {arrow} {} this year",
            format_percent(change)
        )
    }

    pub fn format_description(&self, desc: &CompanyDescription) -> String {
        let header = match &desc.name {
            Some(name) => format!(
                "<b>{}</b> ({})",
                escape_html(&desc.ticker),
                escape_html(name)
            ),
            None => format!("<b>{}</b>", escape_html(&desc.ticker)),
        };
        format!("{header}\n{}", escape_html(&desc.description))
    }

    pub fn format_crypto(&self, snapshot: &CryptoSnapshot) -> String {
        snapshot
            .prices
            .iter()
            .map(format_crypto_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// User-facing text for a failed command
    pub fn format_error(&self, error: &BotError) -> String {
        match error {
            BotError::InvalidCommand(_) => self.format_help(),
            BotError::MissingArgument { command } => {
                format!("Please provide a ticker symbol, e.g., {command} AMZN")
            }
            BotError::TooManyArguments { command } => {
                format!("{command} only supports 1 ticker symbol at a time.")
            }
            BotError::NotFound(ticker) => {
                format!("Ticker symbol '{}' not found.", escape_html(ticker))
            }
            BotError::ServiceUnavailable { .. } | BotError::ProviderRejected { .. } => {
                UNAVAILABLE.to_string()
            }
            BotError::Config(_) | BotError::Unexpected(_) => APOLOGY.to_string(),
        }
    }
}

fn format_crypto_line(price: &CryptoPrice) -> String {
    match price.outcome {
        Ok(amount) => format!(
            "1 {} is {} in {} ({})",
            price.name,
            format_money(amount, price.fiat),
            price.fiat.flag(),
            price.fiat.code()
        ),
        Err(_) => format!("1 {} ({}): data unavailable", price.name, price.fiat.code()),
    }
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // normalise -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Two decimals with an explicit sign, e.g. `+12.34%`
pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", round2(value))
}

/// Fiat symbol, thousands separators and two decimals, e.g. `$65,123.46`
pub fn format_money(amount: f64, fiat: Fiat) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{}{grouped}.{cents}", fiat.symbol())
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
