//! Transport seam between the session engine and the webhook endpoint.
//!
//! The controller only speaks to the endpoint through [`ChatTransport`],
//! which keeps the HTTP client swappable and the engine testable.

use crate::error::Result;
use crate::session::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A file attached to an outbound message.
///
/// Only the bytes and enough metadata to build a multipart request part;
/// upload mechanics beyond that are the transport's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    /// File name reported to the endpoint
    pub file_name: String,
    /// MIME type, when known
    pub media_type: Option<String>,
    /// Raw file content
    pub bytes: Vec<u8>,
}

/// The result of a successful message exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    /// The normalized assistant reply
    pub message: ChatMessage,
    /// Session id returned by the server, when it renamed or continued
    /// the conversation under a different id
    pub session_id: Option<String>,
}

/// Asynchronous transport to one webhook endpoint.
///
/// Implementations hold the endpoint identity; all calls are bounded by a
/// wall-clock timeout and surface failures as typed errors rather than
/// panics.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// The endpoint URL this transport talks to.
    fn endpoint(&self) -> &str;

    /// Sends one user message and returns the normalized reply.
    ///
    /// Exactly one HTTP request is issued per call; retries are the
    /// caller's decision.
    async fn send_message(
        &self,
        session_id: &str,
        chat_input: &str,
        files: &[FileAttachment],
    ) -> Result<SendOutcome>;

    /// Checks whether the endpoint is functional.
    ///
    /// Idempotent and safe to call repeatedly.
    async fn check_connectivity(&self, session_id: &str) -> Result<()>;

    /// Fetches the prior conversation for a session, if the endpoint
    /// keeps one. An endpoint without history yields an empty list.
    async fn load_previous_session(&self, session_id: &str) -> Result<Vec<ChatMessage>>;
}
