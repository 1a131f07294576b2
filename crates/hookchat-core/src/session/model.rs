//! Session domain model.
//!
//! This module contains the core ChatSession entity that represents one
//! conversation thread against a webhook endpoint.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single conversation thread bound to one webhook endpoint.
///
/// A session carries:
/// - Its globally unique identifier (UUID format)
/// - The webhook URL it belongs to
/// - Creation and last-update timestamps
/// - Optional display metadata (title, last message preview)
///
/// The invariant `created_at <= updated_at` holds for the session's whole
/// lifetime. This is the "pure" domain model that business logic operates
/// on, independent of any specific storage format or version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID format)
    pub session_id: String,
    /// The webhook endpoint URL this session belongs to
    pub webhook_url: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Human-readable session title, set after the first exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Preview of the most recent assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl ChatSession {
    /// Creates a new session with a fresh UUID for the given endpoint.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_id(webhook_url, Uuid::new_v4().to_string())
    }

    /// Creates a new session with an externally supplied identifier.
    pub fn with_id(webhook_url: impl Into<String>, session_id: impl Into<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            session_id: session_id.into(),
            webhook_url: webhook_url.into(),
            created_at: now.clone(),
            updated_at: now,
            title: None,
            last_message: None,
        }
    }

    /// Bumps `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }
}
