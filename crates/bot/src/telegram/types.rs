//! Bot API payloads: the subset of fields the bot reads or sends.

use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub message_thread_id: Option<i64>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Message {
    /// Where a reply to this message should go.
    pub fn reply_target(&self) -> ChatTarget {
        ChatTarget { chat_id: self.chat.id, thread_id: self.message_thread_id }
    }

    pub fn sender_name(&self) -> &str {
        self.from.as_ref().map_or("inconnu", |user| user.first_name.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub first_name: String,
}

/// A chat, optionally narrowed to one forum topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTarget {
    pub chat_id: i64,
    pub thread_id: Option<i64>,
}

/// Body of `sendMessage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkPreviewOptions {
    pub is_disabled: bool,
}

impl SendMessage {
    /// Plain text message.
    pub fn text(target: ChatTarget, text: impl Into<String>) -> Self {
        Self {
            chat_id: target.chat_id,
            message_thread_id: target.thread_id,
            text: text.into(),
            parse_mode: None,
            link_preview_options: None,
        }
    }

    /// Message rendered with the legacy `Markdown` parse mode.
    pub fn markdown(target: ChatTarget, text: impl Into<String>) -> Self {
        Self { parse_mode: Some("Markdown"), ..Self::text(target, text) }
    }

    pub fn without_link_preview(mut self) -> Self {
        self.link_preview_options = Some(LinkPreviewOptions { is_disabled: true });
        self
    }
}

/// Query of `getUpdates`.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_with_topic_message() {
        let json = r#"{
            "ok": true,
            "result": [{
                "update_id": 100,
                "message": {
                    "message_id": 7,
                    "message_thread_id": 12,
                    "chat": {"id": -1001, "type": "supergroup"},
                    "from": {"id": 5, "is_bot": false, "first_name": "Camille"},
                    "date": 1715000000,
                    "text": "/panier"
                }
            }]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(response.ok);
        let updates = response.result.unwrap();
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.reply_target(), ChatTarget { chat_id: -1001, thread_id: Some(12) });
        assert_eq!(message.sender_name(), "Camille");
        assert_eq!(message.text.as_deref(), Some("/panier"));
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"ok": false, "error_code": 429, "description": "Too Many Requests", "parameters": {"retry_after": 3}}"#;
        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert!(response.result.is_none());
        assert_eq!(response.error_code, Some(429));
        assert_eq!(response.parameters.and_then(|p| p.retry_after), Some(3));
    }

    #[test]
    fn test_envelope_payload_without_default() {
        let ok: ApiResponse<Update> = serde_json::from_str(r#"{"ok": true, "result": {"update_id": 9}}"#).unwrap();
        assert_eq!(ok.result.map(|u| u.update_id), Some(9));

        let failed: ApiResponse<Update> = serde_json::from_str(r#"{"ok": false, "error_code": 409}"#).unwrap();
        assert!(failed.result.is_none());
    }

    #[test]
    fn test_update_without_message() {
        let json = r#"{"update_id": 3, "edited_message": {"message_id": 1}}"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert!(update.message.is_none());
    }

    #[test]
    fn test_send_message_serialization() {
        let target = ChatTarget { chat_id: 42, thread_id: None };
        let body = serde_json::to_value(SendMessage::text(target, "salut")).unwrap();
        assert_eq!(body, serde_json::json!({"chat_id": 42, "text": "salut"}));

        let target = ChatTarget { chat_id: 42, thread_id: Some(9) };
        let body = serde_json::to_value(SendMessage::markdown(target, "*gras*").without_link_preview()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "chat_id": 42,
                "message_thread_id": 9,
                "text": "*gras*",
                "parse_mode": "Markdown",
                "link_preview_options": {"is_disabled": true}
            })
        );
    }
}
