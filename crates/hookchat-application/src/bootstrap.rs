//! Application-boundary wiring.
//!
//! Convenience constructors that assemble the default stack: a
//! [`WebhookAgent`] transport plus TOML-backed registry and transcript
//! repositories. Nothing here is a singleton; callers that want different
//! backends wire [`ChatController::connect`] themselves.

use crate::controller::{ChatConfig, ChatController};
use hookchat_core::error::Result;
use hookchat_core::session::SessionStore;
use hookchat_infrastructure::{TomlRegistryRepository, TomlTranscriptRepository};
use hookchat_interaction::WebhookAgent;
use std::path::Path;
use std::sync::Arc;

/// Connects a controller storing its data under `base_dir`.
pub async fn connect_in(
    base_dir: impl AsRef<Path>,
    webhook_url: &str,
    provided_session_id: Option<String>,
    config: ChatConfig,
) -> Result<ChatController<WebhookAgent>> {
    let base_dir = base_dir.as_ref();
    let agent = WebhookAgent::new(webhook_url)?;
    let registry = Arc::new(TomlRegistryRepository::new(base_dir)?);
    let transcripts = Arc::new(TomlTranscriptRepository::new(base_dir)?);
    let store = Arc::new(SessionStore::load(registry).await?);
    ChatController::connect(agent, store, transcripts, provided_session_id, config).await
}

/// Connects a controller using the default data directory (`~/.hookchat`).
pub async fn connect_default(
    webhook_url: &str,
    provided_session_id: Option<String>,
    config: ChatConfig,
) -> Result<ChatController<WebhookAgent>> {
    let agent = WebhookAgent::new(webhook_url)?;
    let registry = Arc::new(TomlRegistryRepository::default_location()?);
    let transcripts = Arc::new(TomlTranscriptRepository::default_location()?);
    let store = Arc::new(SessionStore::load(registry).await?);
    ChatController::connect(agent, store, transcripts, provided_session_id, config).await
}
