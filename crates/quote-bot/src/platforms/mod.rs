//! Platform-specific bot implementations

pub mod telegram;
pub mod webhook;

pub use telegram::{Update, WebhookReply};
pub use webhook::{build_webhook_app, serve};
