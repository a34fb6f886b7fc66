//! Telegram update and webhook reply types
//!
//! Only the fields the bot reads are modelled; serde ignores the rest of
//! the update payload.

use serde::{Deserialize, Serialize};

/// Incoming update envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
}

impl Update {
    /// Chat id, sender first name and text, when the update carries a text message
    pub fn text_message(&self) -> Option<(i64, Option<&str>, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref().filter(|t| !t.trim().is_empty())?;
        let sender = message.from.as_ref().map(|u| u.first_name.as_str());
        Some((message.chat.id, sender, text))
    }
}

/// Best-effort chat id from a payload that failed to deserialize
pub fn salvage_chat_id(body: &[u8]) -> Option<i64> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.pointer("/message/chat/id")?.as_i64()
}

/// Bot API method returned as the webhook response body
///
/// Telegram executes it on the bot's behalf, so no outbound call is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method")]
pub enum WebhookReply {
    #[serde(rename = "sendMessage")]
    SendMessage {
        #[serde(skip_serializing_if = "Option::is_none")]
        chat_id: Option<i64>,
        text: String,
        parse_mode: &'static str,
        disable_web_page_preview: bool,
    },
}

impl WebhookReply {
    /// HTML message to `chat_id`
    pub fn send_message(chat_id: Option<i64>, text: impl Into<String>) -> Self {
        WebhookReply::SendMessage {
            chat_id,
            text: text.into(),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_text_message() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 98765,
            "message": {
                "message_id": 67890,
                "from": {"id": 777, "is_bot": false, "first_name": "TestUser"},
                "chat": {"id": 12345, "type": "private", "first_name": "TestUser"},
                "date": 1_614_569_999,
                "text": "/ytd AAPL"
            }
        }))
        .unwrap();

        assert_eq!(update.text_message(), Some((12345, Some("TestUser"), "/ytd AAPL")));
    }

    #[test]
    fn test_update_without_text() {
        let update: Update = serde_json::from_str(r#"{"update_id": 123}"#).unwrap();
        assert!(update.text_message().is_none());

        let update: Update = serde_json::from_str(
            r#"{"update_id": 1, "message": {"message_id": 2, "chat": {"id": 3}, "sticker": {}}}"#,
        )
        .unwrap();
        assert!(update.text_message().is_none());
    }

    #[test]
    fn test_salvage_chat_id() {
        assert_eq!(
            salvage_chat_id(br#"{"update_id": "bad", "message": {"chat": {"id": 42}}}"#),
            Some(42)
        );
        assert_eq!(salvage_chat_id(b"not json"), None);
    }

    #[test]
    fn test_reply_envelope() {
        let json = serde_json::to_value(WebhookReply::send_message(Some(42), "hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "method": "sendMessage",
                "chat_id": 42,
                "text": "hi",
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })
        );

        let json = serde_json::to_value(WebhookReply::send_message(None, "hi")).unwrap();
        assert!(json.get("chat_id").is_none());
    }
}
