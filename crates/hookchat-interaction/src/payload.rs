//! Wire payload types for the webhook protocol.

use serde::{Deserialize, Serialize};

/// Action name for sending a chat message.
pub const SEND_MESSAGE_ACTION: &str = "sendMessage";
/// Action name for loading a previous conversation.
pub const LOAD_PREVIOUS_SESSION_ACTION: &str = "loadPreviousSession";

/// Body of an outbound `sendMessage` request.
///
/// Field names follow the endpoint's camelCase convention. When files are
/// attached the same JSON travels inside the multipart `data` field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest<'a> {
    pub action: &'a str,
    pub chat_input: &'a str,
    pub session_id: &'a str,
}

impl<'a> SendMessageRequest<'a> {
    pub fn new(chat_input: &'a str, session_id: &'a str) -> Self {
        Self {
            action: SEND_MESSAGE_ACTION,
            chat_input,
            session_id,
        }
    }
}

/// One entry of the legacy bulk-history response.
///
/// The endpoint returns serialized framework objects shaped as
/// `{id: [..], kwargs: {content, additional_kwargs?}, lc, type}`; only the
/// fields the engine needs are modeled, the rest are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem {
    #[serde(default)]
    pub id: Vec<String>,
    pub kwargs: HistoryItemKwargs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItemKwargs {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub additional_kwargs: Option<HistoryItemRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItemRole {
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_request_uses_camel_case() {
        let request = SendMessageRequest::new("hi", "S1");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "action": "sendMessage",
                "chatInput": "hi",
                "sessionId": "S1",
            })
        );
    }

    #[test]
    fn test_history_item_tolerates_extra_fields() {
        let raw = serde_json::json!({
            "id": ["langchain", "schema", "AIMessage"],
            "kwargs": {"content": "hello", "additional_kwargs": {"role": "user"}},
            "lc": 1,
            "type": "constructor",
        });
        let item: HistoryItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.id.join("-"), "langchain-schema-AIMessage");
        assert_eq!(item.kwargs.content, "hello");
        assert_eq!(
            item.kwargs.additional_kwargs.unwrap().role.as_deref(),
            Some("user")
        );
    }
}
