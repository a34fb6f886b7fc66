//! Quote bot server
//!
//! # Usage
//!
//! ```bash
//! export TELEGRAM_TOKEN="123456789:ABC..."
//! export POLYGON_API_KEY="..."
//!
//! # Serve the webhook, registering it first
//! quote-bot serve --register --url https://bot.example.com/webhook
//!
//! # Only register the webhook and command menu
//! quote-bot set-webhook https://bot.example.com/webhook
//! ```

use clap::{Parser, Subcommand};
use quote_bot::BotConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quote-bot")]
#[command(about = "Telegram webhook bot for stock and crypto quotes", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the webhook HTTP server
    Serve {
        /// Listen address, overrides BIND_ADDR
        #[arg(short, long)]
        bind: Option<String>,

        /// Register the webhook with Telegram before serving
        #[arg(long)]
        register: bool,

        /// Public webhook URL, overrides TELEGRAM_WEBHOOK_URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Register the webhook URL and command menu, then exit
    SetWebhook {
        /// Public webhook URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    quote_bot_utils::init_tracing();

    let args = Args::parse();
    let mut config = BotConfig::from_env()?;
    info!(?config, "Loaded configuration");

    match args.command {
        Cmd::Serve {
            bind,
            register,
            url,
        } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(url) = url {
                config.webhook_url = Some(url);
            }

            match config.webhook_url.as_deref() {
                Some(url) if register || std::env::var_os("TELEGRAM_WEBHOOK_URL").is_some() => {
                    quote_bot::register_webhook(&config, url).await?;
                }
                None if register => {
                    anyhow::bail!("--register needs --url or TELEGRAM_WEBHOOK_URL");
                }
                _ => {}
            }

            let app = quote_bot::build_app(&config)?;
            quote_bot::platforms::serve(&config.bind_addr, app).await?;
        }
        Cmd::SetWebhook { url } => {
            quote_bot::register_webhook(&config, &url).await?;
            println!("Webhook set to {url}");
        }
    }

    Ok(())
}
