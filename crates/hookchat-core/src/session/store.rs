//! Durable session store.
//!
//! [`SessionStore`] wraps the in-memory [`SessionRegistry`] with a
//! persistence backend. The registry is loaded once at construction and
//! rewritten through the repository after every mutation, so it survives
//! process restarts.

use super::model::ChatSession;
use super::registry::SessionRegistry;
use super::repository::RegistryRepository;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide registry of sessions with durable persistence.
///
/// `SessionStore` is responsible for:
/// - Resolving the active session for an endpoint
/// - Creating new sessions (explicit "new chat")
/// - Reverse lookups from session id to endpoint
/// - Keeping the persisted registry in sync with every mutation
pub struct SessionStore {
    /// In-memory registry, guarded for shared access
    registry: RwLock<SessionRegistry>,
    /// Persistent storage backend for the registry blob
    repository: Arc<dyn RegistryRepository>,
}

impl SessionStore {
    /// Loads the persisted registry and wraps it in a store.
    ///
    /// A missing blob yields an empty registry.
    pub async fn load(repository: Arc<dyn RegistryRepository>) -> Result<Self> {
        let registry = repository.load().await?.unwrap_or_default();
        Ok(Self {
            registry: RwLock::new(registry),
            repository,
        })
    }

    /// Returns the most recently updated session id for the endpoint,
    /// creating a new session when none exists yet.
    pub async fn get_or_create_session_id(&self, endpoint: &str) -> Result<String> {
        let mut registry = self.registry.write().await;
        if let Some(session) = registry.most_recent(endpoint) {
            return Ok(session.session_id);
        }
        let session_id = registry.create(endpoint);
        self.repository.save(&registry).await?;
        Ok(session_id)
    }

    /// Unconditionally creates a new session for the endpoint.
    ///
    /// Used for an explicit "new chat"; existing sessions for the same
    /// endpoint are kept untouched.
    pub async fn create_session(&self, endpoint: &str) -> Result<String> {
        let mut registry = self.registry.write().await;
        let session_id = registry.create(endpoint);
        self.repository.save(&registry).await?;
        Ok(session_id)
    }

    /// Reverse lookup from session id to endpoint URL.
    pub async fn endpoint_for_session(&self, session_id: &str) -> Option<String> {
        let registry = self.registry.read().await;
        registry.endpoint_for(session_id).map(str::to_string)
    }

    /// Idempotently registers an externally supplied session id (e.g.,
    /// one carried in a shared URL) against an endpoint.
    ///
    /// If the id is already registered under a different endpoint, the
    /// existing registration is authoritative and only its `updated_at`
    /// is refreshed.
    pub async fn set_session(&self, endpoint: &str, session_id: &str) -> Result<()> {
        let mut registry = self.registry.write().await;
        registry.register(endpoint, session_id);
        self.repository.save(&registry).await
    }

    /// Refreshes `updated_at` for the (endpoint, session id) pair,
    /// repairing the reverse index when the server renamed the session.
    pub async fn update_session(&self, endpoint: &str, session_id: &str) -> Result<()> {
        let mut registry = self.registry.write().await;
        registry.refresh(endpoint, session_id);
        self.repository.save(&registry).await
    }

    /// Deletes a session wherever it is registered.
    ///
    /// Idempotent: deleting an unknown or already-deleted id is a no-op
    /// and does not touch the persisted blob.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut registry = self.registry.write().await;
        if registry.remove(session_id) {
            self.repository.save(&registry).await?;
        }
        Ok(())
    }

    /// All sessions across all endpoints, most recently updated first.
    pub async fn list_all(&self) -> Vec<ChatSession> {
        self.registry.read().await.list_all()
    }

    /// Sessions for one endpoint, most recently updated first.
    pub async fn list_by_endpoint(&self, endpoint: &str) -> Vec<ChatSession> {
        self.registry.read().await.list_by_endpoint(endpoint)
    }

    /// The most recently updated session for an endpoint, if any.
    pub async fn most_recent(&self, endpoint: &str) -> Option<ChatSession> {
        self.registry.read().await.most_recent(endpoint)
    }

    /// Patches display metadata (title, last message preview) and bumps
    /// `updated_at`. Unknown session ids are a no-op.
    pub async fn update_metadata(
        &self,
        session_id: &str,
        title: Option<String>,
        last_message: Option<String>,
    ) -> Result<()> {
        let mut registry = self.registry.write().await;
        if registry.update_metadata(session_id, title, last_message) {
            self.repository.save(&registry).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const ENDPOINT: &str = "https://x/webhook";

    /// In-memory RegistryRepository for testing, with a save counter.
    struct MockRegistryRepository {
        stored: Mutex<Option<SessionRegistry>>,
        saves: Mutex<usize>,
    }

    impl MockRegistryRepository {
        fn new() -> Self {
            Self {
                stored: Mutex::new(None),
                saves: Mutex::new(0),
            }
        }

        fn save_count(&self) -> usize {
            *self.saves.lock().unwrap()
        }
    }

    #[async_trait]
    impl RegistryRepository for MockRegistryRepository {
        async fn load(&self) -> Result<Option<SessionRegistry>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, registry: &SessionRegistry) -> Result<()> {
            *self.stored.lock().unwrap() = Some(registry.clone());
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_get_or_create_is_stable() {
        let repository = Arc::new(MockRegistryRepository::new());
        let store = SessionStore::load(repository).await.unwrap();

        let first = store.get_or_create_session_id(ENDPOINT).await.unwrap();
        let second = store.get_or_create_session_id(ENDPOINT).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_create_session_always_creates() {
        let repository = Arc::new(MockRegistryRepository::new());
        let store = SessionStore::load(repository).await.unwrap();

        let first = store.get_or_create_session_id(ENDPOINT).await.unwrap();
        let second = store.create_session(ENDPOINT).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.list_by_endpoint(ENDPOINT).await.len(), 2);
    }

    #[tokio::test]
    async fn test_reverse_lookup_until_deleted() {
        let repository = Arc::new(MockRegistryRepository::new());
        let store = SessionStore::load(repository).await.unwrap();

        let session_id = store.create_session(ENDPOINT).await.unwrap();
        assert_eq!(
            store.endpoint_for_session(&session_id).await,
            Some(ENDPOINT.to_string())
        );

        store.delete_session(&session_id).await.unwrap();
        assert_eq!(store.endpoint_for_session(&session_id).await, None);
    }

    #[tokio::test]
    async fn test_delete_unknown_session_does_not_persist() {
        let repository = Arc::new(MockRegistryRepository::new());
        let store = SessionStore::load(repository.clone()).await.unwrap();

        store.delete_session("unknown").await.unwrap();
        assert_eq!(repository.save_count(), 0);
    }

    #[tokio::test]
    async fn test_registry_survives_reload() {
        let repository = Arc::new(MockRegistryRepository::new());
        let session_id = {
            let store = SessionStore::load(repository.clone()).await.unwrap();
            store.create_session(ENDPOINT).await.unwrap()
        };

        let reloaded = SessionStore::load(repository).await.unwrap();
        assert_eq!(
            reloaded.endpoint_for_session(&session_id).await,
            Some(ENDPOINT.to_string())
        );
    }

    #[tokio::test]
    async fn test_update_metadata_persists() {
        let repository = Arc::new(MockRegistryRepository::new());
        let store = SessionStore::load(repository.clone()).await.unwrap();

        let session_id = store.create_session(ENDPOINT).await.unwrap();
        store
            .update_metadata(&session_id, Some("First words".into()), Some("hi".into()))
            .await
            .unwrap();

        let session = store.most_recent(ENDPOINT).await.unwrap();
        assert_eq!(session.title.as_deref(), Some("First words"));

        // Unknown ids are a silent no-op
        let before = repository.save_count();
        store
            .update_metadata("unknown", Some("t".into()), None)
            .await
            .unwrap();
        assert_eq!(repository.save_count(), before);
    }
}
