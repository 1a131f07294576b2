//! Chat session controller.
//!
//! `ChatController` is the state machine behind one live conversation. It
//! resolves the session identity through the [`SessionStore`], hydrates
//! the transcript from cache or upstream history, submits messages over a
//! [`ChatTransport`], and keeps the store and transcript cache in sync
//! with every exchange.
//!
//! Methods take `&mut self`, so a second submission cannot start while
//! one is in flight; the rendering layer drives the controller from a
//! single event loop and disables input while `is_sending()` is true.

use hookchat_core::error::{HookchatError, Result};
use hookchat_core::session::{ChatMessage, SessionStore, TranscriptRepository};
use hookchat_core::transport::{ChatTransport, FileAttachment};
use std::sync::Arc;

/// Maximum characters of a user message used as a session title.
const TITLE_PREVIEW_CHARS: usize = 48;
/// Maximum characters of an assistant reply kept as the last-message preview.
const LAST_MESSAGE_PREVIEW_CHARS: usize = 120;

/// Options for a new controller.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Assistant greetings to seed an otherwise empty transcript with.
    pub initial_messages: Vec<String>,
}

/// Lifecycle phase of the controller.
///
/// Connection trouble is tracked separately in the error slot: the
/// controller stays usable-looking (`Ready`) but rejects sends until a
/// re-validation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No session id resolved yet.
    Uninitialized,
    /// Resolving identity, hydrating history, probing the endpoint.
    Validating,
    /// Accepting submissions.
    Ready,
    /// A submission round trip is in flight.
    Sending,
}

/// Orchestrates one conversation against one webhook endpoint.
pub struct ChatController<T: ChatTransport> {
    transport: T,
    store: Arc<SessionStore>,
    transcripts: Arc<dyn TranscriptRepository>,
    config: ChatConfig,
    endpoint: String,
    session_id: String,
    transcript: Vec<ChatMessage>,
    phase: Phase,
    error: Option<String>,
}

impl<T: ChatTransport> ChatController<T> {
    /// Connects a controller: resolves the session id, hydrates the
    /// transcript, and probes the endpoint.
    ///
    /// Only configuration problems (an empty endpoint) and registry
    /// persistence failures are hard errors. A failed connectivity probe
    /// still yields a controller, carrying the failure in `error()`;
    /// hydration failures degrade to an empty transcript.
    ///
    /// `provided_session_id` registers an externally supplied id (e.g.,
    /// one carried in a shared URL) instead of resolving one from the
    /// store.
    pub async fn connect(
        transport: T,
        store: Arc<SessionStore>,
        transcripts: Arc<dyn TranscriptRepository>,
        provided_session_id: Option<String>,
        config: ChatConfig,
    ) -> Result<Self> {
        let endpoint = transport.endpoint().to_string();
        if endpoint.trim().is_empty() {
            return Err(HookchatError::config("webhook URL is required"));
        }

        let mut controller = Self {
            transport,
            store,
            transcripts,
            config,
            endpoint,
            session_id: String::new(),
            transcript: Vec::new(),
            phase: Phase::Uninitialized,
            error: None,
        };
        controller.initialize(provided_session_id).await?;
        Ok(controller)
    }

    async fn initialize(&mut self, provided_session_id: Option<String>) -> Result<()> {
        self.phase = Phase::Validating;

        self.session_id = match provided_session_id {
            Some(id) if !id.trim().is_empty() => {
                self.store.set_session(&self.endpoint, &id).await?;
                id
            }
            _ => self.store.get_or_create_session_id(&self.endpoint).await?,
        };

        self.hydrate().await;
        self.validate_connection().await;
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Populates the transcript: cached copy first, then upstream
    /// history, then configured initial messages. Failures along the way
    /// are logged and degrade to the next source.
    async fn hydrate(&mut self) {
        let cached = self
            .transcripts
            .load(&self.endpoint, &self.session_id)
            .await;
        match cached {
            Ok(Some(messages)) if !messages.is_empty() => {
                self.transcript = messages;
                return;
            }
            Ok(_) => {}
            Err(err) => tracing::debug!("transcript cache load failed: {err}"),
        }

        let history = self.transport.load_previous_session(&self.session_id).await;
        match history {
            Ok(messages) if !messages.is_empty() => {
                self.transcript = messages;
                self.persist_transcript().await;
                return;
            }
            Ok(_) => {}
            Err(err) => tracing::debug!("history hydration failed: {err}"),
        }

        if !self.config.initial_messages.is_empty() {
            self.transcript = self
                .config
                .initial_messages
                .iter()
                .map(|content| ChatMessage::assistant(content.clone()))
                .collect();
            self.persist_transcript().await;
        }
    }

    /// Probes the endpoint and records the outcome.
    ///
    /// Idempotent and safe to call repeatedly; never touches the
    /// transcript. Returns true when the endpoint is functional.
    pub async fn validate_connection(&mut self) -> bool {
        match self.transport.check_connectivity(&self.session_id).await {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Submits a user message and returns the assistant reply.
    ///
    /// - Empty input with no files is silently ignored (`Ok(None)`).
    /// - When the controller is errored, validation is re-run first; if
    ///   the endpoint is still down the submission is rejected without a
    ///   request.
    /// - The user message is appended optimistically before the round
    ///   trip, so it always orders ahead of the reply.
    /// - Exactly one request is issued; retrying is the caller's call.
    pub async fn submit(
        &mut self,
        text: &str,
        files: &[FileAttachment],
    ) -> Result<Option<ChatMessage>> {
        let trimmed = text.trim();
        if trimmed.is_empty() && files.is_empty() {
            return Ok(None);
        }

        if self.error.is_some() && !self.validate_connection().await {
            let message = "Cannot send message: webhook endpoint is not functional".to_string();
            self.error = Some(message.clone());
            return Err(HookchatError::connectivity(message));
        }

        self.phase = Phase::Sending;
        self.error = None;

        self.append_user_message(trimmed).await;
        let first_user_message = self
            .transcript
            .iter()
            .filter(|message| message.role == hookchat_core::session::MessageRole::User)
            .count()
            == 1;

        let outcome = self
            .transport
            .send_message(&self.session_id, trimmed, files)
            .await;
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                self.phase = Phase::Ready;
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        // The server may rename or continue the conversation under a new
        // id; it becomes the id for all subsequent requests.
        if let Some(server_session_id) = outcome.session_id {
            if let Err(err) = self
                .store
                .update_session(&self.endpoint, &server_session_id)
                .await
            {
                self.phase = Phase::Ready;
                self.error = Some(err.to_string());
                return Err(err);
            }
            self.session_id = server_session_id;
        }

        let reply = outcome.message;
        self.transcript.push(reply.clone());
        self.persist_transcript().await;
        self.update_session_metadata(first_user_message.then_some(trimmed), &reply)
            .await;

        self.phase = Phase::Ready;
        Ok(Some(reply))
    }

    /// Appends the optimistic user message and rewrites the cache.
    async fn append_user_message(&mut self, content: &str) {
        self.transcript.push(ChatMessage::user(content));
        self.persist_transcript().await;
    }

    /// Clears the conversation and starts a fresh session.
    ///
    /// The cache entry for the old session is removed and a brand-new
    /// session id is obtained; old and new conversations never share one.
    /// Returns the new session id.
    pub async fn clear_history(&mut self) -> Result<String> {
        self.transcript.clear();
        if let Err(err) = self
            .transcripts
            .clear(&self.endpoint, &self.session_id)
            .await
        {
            tracing::warn!("failed to clear transcript cache: {err}");
        }
        let session_id = self.store.create_session(&self.endpoint).await?;
        self.session_id = session_id.clone();
        Ok(session_id)
    }

    async fn persist_transcript(&self) {
        if let Err(err) = self
            .transcripts
            .save(&self.endpoint, &self.session_id, &self.transcript)
            .await
        {
            tracing::warn!("failed to persist transcript: {err}");
        }
    }

    async fn update_session_metadata(&self, title_source: Option<&str>, reply: &ChatMessage) {
        let title = title_source.map(|text| preview(text, TITLE_PREVIEW_CHARS));
        let last_message = Some(preview(&reply.content, LAST_MESSAGE_PREVIEW_CHARS));
        if let Err(err) = self
            .store
            .update_metadata(&self.session_id, title, last_message)
            .await
        {
            tracing::warn!("failed to update session metadata: {err}");
        }
    }

    /// The endpoint this controller talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The active session id.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The live transcript, oldest message first.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a submission round trip is in flight.
    pub fn is_sending(&self) -> bool {
        self.phase == Phase::Sending
    }

    /// The current error, if the controller is in trouble.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when the last probe or send left the controller errored.
    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
