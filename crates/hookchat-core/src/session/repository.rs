//! Persistence traits for the session registry and transcript cache.
//!
//! These traits decouple the engine's core logic from the specific storage
//! mechanism (e.g., TOML files, a database, browser-style local storage).

use super::message::ChatMessage;
use super::registry::SessionRegistry;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the durable session registry.
///
/// The whole registry is treated as one blob: it is loaded once at process
/// start and rewritten in full after every mutation.
///
/// # Implementation Notes
///
/// Implementations should handle schema versioning and migrations so that
/// callers always receive the current registry shape.
#[async_trait]
pub trait RegistryRepository: Send + Sync {
    /// Loads the persisted registry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(SessionRegistry))`: a registry was found and parsed
    /// - `Ok(None)`: nothing has been persisted yet
    /// - `Err(_)`: error occurred during retrieval
    async fn load(&self) -> Result<Option<SessionRegistry>>;

    /// Persists the registry, replacing any previous blob.
    async fn save(&self, registry: &SessionRegistry) -> Result<()>;
}

/// An abstract repository for per-session transcript caches.
///
/// Entries are keyed by (endpoint URL, session id). The cache is a
/// best-effort accelerator for reloads, never the source of truth for
/// session identity.
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Loads the cached transcript for a session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(messages))`: an entry exists (possibly empty)
    /// - `Ok(None)`: no entry was ever cached, or the entry was corrupt
    ///   and has been discarded
    /// - `Err(_)`: error occurred during retrieval
    async fn load(&self, endpoint: &str, session_id: &str) -> Result<Option<Vec<ChatMessage>>>;

    /// Replaces the cached transcript for a session.
    ///
    /// Implementations bound the entry to the most recent N messages,
    /// dropping the oldest first.
    async fn save(&self, endpoint: &str, session_id: &str, messages: &[ChatMessage])
    -> Result<()>;

    /// Removes the cache entry for a session entirely.
    async fn clear(&self, endpoint: &str, session_id: &str) -> Result<()>;
}
