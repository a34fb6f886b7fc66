//! HTTP entry point: axum router, handler and server loop

use super::telegram::{Update, WebhookReply, salvage_chat_id};
use crate::bot::CommandRouter;
use crate::interface::APOLOGY;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;

pub const TELEGRAM_WEBHOOK_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    router: CommandRouter,
    secret_token: Option<String>,
}

/// Build the axum app serving `POST {path}` and `GET /health`
pub fn build_webhook_app(
    router: CommandRouter,
    path: &str,
    secret_token: Option<String>,
) -> Router {
    let state = WebhookState {
        router,
        secret_token,
    };

    Router::new()
        .route(path, post(webhook_handler))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// Serve until ctrl-c
pub async fn serve(bind_addr: &str, app: Router) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {error}");
            }
            tracing::info!("Shutting down webhook server");
        })
        .await
}

async fn webhook_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !secret_matches(&headers, state.secret_token.as_deref()) {
        tracing::warn!("Rejected webhook call with invalid secret token");
        return (
            StatusCode::UNAUTHORIZED,
            "invalid telegram webhook secret token",
        )
            .into_response();
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(error) => {
            tracing::warn!(%error, bytes = body.len(), "Malformed webhook payload");
            let reply = WebhookReply::send_message(salvage_chat_id(&body), APOLOGY);
            return Json(reply).into_response();
        }
    };

    let Some((chat_id, sender, text)) = update.text_message() else {
        tracing::debug!(update_id = update.update_id, "Update without text message, ignoring");
        return StatusCode::OK.into_response();
    };

    if !state.router.is_addressed(text) {
        tracing::debug!(update_id = update.update_id, "Command addressed to another bot, ignoring");
        return StatusCode::OK.into_response();
    }

    tracing::info!(update_id = update.update_id, chat_id, "Webhook received Telegram update");

    let router = state.router.clone();
    let text = text.to_string();
    let sender = sender.map(str::to_string);
    let handled =
        tokio::spawn(async move { router.handle(&text, sender.as_deref()).await }).await;

    let reply_text = match handled {
        Ok(reply) => reply,
        Err(error) => {
            tracing::error!(update_id = update.update_id, %error, "Command handler aborted");
            APOLOGY.to_string()
        }
    };

    Json(WebhookReply::send_message(Some(chat_id), reply_text)).into_response()
}

fn secret_matches(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(TELEGRAM_WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|provided| provided == expected)
}
