#![allow(dead_code)]

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

pub const WEBHOOK_PATH: &str = "/webhook";

pub fn sample_update(text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": 98765,
        "message": {
            "message_id": 67890,
            "from": {"id": 777, "is_bot": false, "first_name": "TestUser"},
            "chat": {"id": 12345, "type": "private", "first_name": "TestUser"},
            "date": 1_614_569_999,
            "text": text
        }
    })
}

/// POST a raw body; returns status and body parsed as JSON (Null when empty)
pub async fn post_raw(
    app: Router,
    body: impl Into<Body>,
    headers: &[(&str, &str)],
) -> Result<(StatusCode, serde_json::Value)> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(WEBHOOK_PATH)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let response = app.oneshot(builder.body(body.into())?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    Ok((status, json))
}

pub async fn post_update(app: Router, text: &str) -> Result<(StatusCode, serde_json::Value)> {
    post_raw(app, sample_update(text).to_string(), &[]).await
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_server(app: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}
