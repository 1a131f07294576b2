//! Normalization of upstream response payloads.
//!
//! Webhook workflows answer in several shapes depending on how they are
//! wired: a single `output` value, a structured `messages` array, a bare
//! `content` string, or something else entirely. The decoders here turn
//! any of them into canonical [`ChatMessage`] values. Decoding is pure,
//! deterministic, and total: it never fails, it degrades.

use crate::payload::HistoryItem;
use chrono::Utc;
use hookchat_core::session::{ChatMessage, MessageRole};
use serde_json::Value;
use uuid::Uuid;

/// Decodes one send-message reply into an assistant message.
///
/// Fields are inspected in strict priority order, first match wins:
///
/// 1. `output` present (any value, including null): a string is taken
///    verbatim, anything else is pretty-printed as JSON.
/// 2. `messages` is a non-empty array: the last entry whose role is
///    `assistant` is passed through.
/// 3. `content` is a string: wrapped as an assistant message.
/// 4. Fallback: the whole payload is stringified, so a successful HTTP
///    response always yields a message even for unknown formats.
pub fn decode_reply(payload: &Value) -> ChatMessage {
    if let Some(output) = payload.get("output") {
        let content = match output {
            Value::String(text) => text.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        };
        return ChatMessage::assistant(content);
    }

    if let Some(messages) = payload.get("messages").and_then(Value::as_array) {
        let last_assistant = messages
            .iter()
            .rev()
            .find(|message| message.get("role").and_then(Value::as_str) == Some("assistant"));
        if let Some(message) = last_assistant {
            return canonical_message(message, MessageRole::Assistant);
        }
    }

    if let Some(content) = payload.get("content").and_then(Value::as_str) {
        return ChatMessage::assistant(content.to_string());
    }

    ChatMessage::assistant(payload.to_string())
}

/// Decodes a previous-session history response into an ordered transcript.
///
/// Accepted shapes, probed in order:
///
/// - a legacy item list `[{id: [..], kwargs: {content, additional_kwargs?},
///   ..}]`; role comes from `additional_kwargs.role` (default assistant),
///   the id from `id.join("-")` with a positional fallback
/// - an object with a `messages` array
/// - an object with an `output` value, yielding a single message
///
/// Anything else decodes to an empty transcript. The upstream carries no
/// timestamps for history items, so all of them get the decode time and
/// the input order is preserved as-is.
pub fn decode_history(payload: &Value) -> Vec<ChatMessage> {
    if let Some(items) = payload.as_array() {
        if items.first().and_then(|item| item.get("kwargs")).is_some() {
            if let Ok(items) = serde_json::from_value::<Vec<HistoryItem>>(payload.clone()) {
                return items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| legacy_item_message(index, item))
                    .collect();
            }
        }
        return Vec::new();
    }

    if let Some(messages) = payload.get("messages").and_then(Value::as_array) {
        return messages
            .iter()
            .map(|message| canonical_message(message, MessageRole::Assistant))
            .collect();
    }

    if payload.get("output").is_some() {
        return vec![decode_reply(payload)];
    }

    Vec::new()
}

/// Fills in whatever a loosely shaped message object is missing so the
/// result is always canonical.
fn canonical_message(value: &Value, default_role: MessageRole) -> ChatMessage {
    let role = match value.get("role").and_then(Value::as_str) {
        Some("user") => MessageRole::User,
        Some("assistant") => MessageRole::Assistant,
        _ => default_role,
    };
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let content = value
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_str)
        .filter(|timestamp| !timestamp.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Utc::now().to_rfc3339());
    ChatMessage {
        id,
        content,
        role,
        timestamp,
    }
}

fn legacy_item_message(index: usize, item: HistoryItem) -> ChatMessage {
    let id = if item.id.is_empty() {
        format!("msg-{index}")
    } else {
        item.id.join("-")
    };
    let role = match item
        .kwargs
        .additional_kwargs
        .and_then(|kwargs| kwargs.role)
        .as_deref()
    {
        Some("user") => MessageRole::User,
        _ => MessageRole::Assistant,
    };
    ChatMessage {
        id,
        content: item.kwargs.content,
        role,
        timestamp: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_string_is_taken_verbatim() {
        let message = decode_reply(&json!({"output": "hello!"}));
        assert_eq!(message.content, "hello!");
        assert_eq!(message.role, MessageRole::Assistant);
    }

    #[test]
    fn test_output_object_is_pretty_printed() {
        let message = decode_reply(&json!({"output": {"answer": 42}}));
        assert_eq!(message.content, "{\n  \"answer\": 42\n}");
    }

    #[test]
    fn test_output_null_still_counts_as_present() {
        let message = decode_reply(&json!({"output": null}));
        assert_eq!(message.content, "null");
    }

    #[test]
    fn test_output_wins_over_messages() {
        let payload = json!({
            "output": "from output",
            "messages": [{"role": "assistant", "content": "from messages"}],
        });
        assert_eq!(decode_reply(&payload).content, "from output");
    }

    #[test]
    fn test_last_assistant_message_is_selected() {
        let payload = json!({"messages": [
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "A"},
            {"role": "assistant", "content": "B"},
        ]});
        let message = decode_reply(&payload);
        assert_eq!(message.content, "B");
        assert_eq!(message.role, MessageRole::Assistant);
    }

    #[test]
    fn test_messages_without_assistant_falls_through() {
        let payload = json!({"messages": [{"role": "user", "content": "hi"}]});
        let message = decode_reply(&payload);
        // Degrades to the stringified payload rather than returning nothing
        assert!(message.content.contains("messages"));
    }

    #[test]
    fn test_content_string_is_wrapped() {
        let message = decode_reply(&json!({"content": "plain"}));
        assert_eq!(message.content, "plain");
    }

    #[test]
    fn test_unknown_shapes_never_fail() {
        for payload in [
            json!({}),
            json!(null),
            json!(17),
            json!(["a", "b"]),
            json!({"unexpected": {"deeply": ["nested", true]}}),
        ] {
            let message = decode_reply(&payload);
            assert_eq!(message.role, MessageRole::Assistant);
            assert!(!message.id.is_empty());
        }
    }

    #[test]
    fn test_passthrough_message_is_canonicalized() {
        // Missing id and timestamp get filled in
        let payload = json!({"messages": [{"role": "assistant", "content": "A"}]});
        let message = decode_reply(&payload);
        assert!(!message.id.is_empty());
        assert!(!message.timestamp.is_empty());
    }

    #[test]
    fn test_history_legacy_items() {
        let payload = json!([
            {"id": ["schema", "HumanMessage"], "kwargs": {"content": "hi", "additional_kwargs": {"role": "user"}}, "lc": 1, "type": "constructor"},
            {"id": [], "kwargs": {"content": "hello!"}, "lc": 1, "type": "constructor"},
        ]);
        let messages = decode_history(&payload);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "schema-HumanMessage");
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].id, "msg-1");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        // Input order is preserved
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].content, "hello!");
    }

    #[test]
    fn test_history_messages_array() {
        let payload = json!({"messages": [
            {"role": "user", "content": "hi"},
            {"role": "assistant", "content": "hello!"},
        ]});
        let messages = decode_history(&payload);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
    }

    #[test]
    fn test_history_output_shape() {
        let messages = decode_history(&json!({"output": "summary"}));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "summary");
    }

    #[test]
    fn test_history_unknown_shape_is_empty() {
        assert!(decode_history(&json!({"status": "ok"})).is_empty());
        assert!(decode_history(&json!([1, 2, 3])).is_empty());
        assert!(decode_history(&json!(null)).is_empty());
    }
}
