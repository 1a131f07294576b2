//! In-memory session registry.
//!
//! The registry partitions sessions by webhook endpoint URL and keeps a
//! reverse index from session id back to its endpoint. Both maps are
//! mutated together under every operation, so a session id present in the
//! reverse index always references a session stored under the same
//! endpoint in the forward map.

use super::model::ChatSession;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registry of all known sessions, keyed by webhook endpoint URL.
///
/// This is a pure in-memory structure. Persistence is layered on top by
/// [`SessionStore`](super::store::SessionStore), which rewrites the whole
/// registry through a repository after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRegistry {
    /// Sessions per endpoint. Insertion order is irrelevant; consumers
    /// re-sort by `updated_at` descending.
    sessions: HashMap<String, Vec<ChatSession>>,
    /// Reverse index from session id to its endpoint URL.
    session_index: HashMap<String, String>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a registry from a plain endpoint-to-sessions map.
    ///
    /// The reverse index is derived from the forward map, which makes the
    /// lockstep invariant hold by construction even if the source data
    /// carried a stale index.
    pub fn from_sessions(sessions: HashMap<String, Vec<ChatSession>>) -> Self {
        let mut session_index = HashMap::new();
        for (endpoint, list) in &sessions {
            for session in list {
                session_index.insert(session.session_id.clone(), endpoint.clone());
            }
        }
        Self {
            sessions,
            session_index,
        }
    }

    /// Returns the forward map for persistence.
    pub fn sessions(&self) -> &HashMap<String, Vec<ChatSession>> {
        &self.sessions
    }

    /// Returns true if no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.session_index.is_empty()
    }

    /// Creates a brand-new session for the endpoint and returns its id.
    ///
    /// Always creates, even when other sessions already exist for the same
    /// endpoint. Multiple concurrent sessions per endpoint are supported.
    pub fn create(&mut self, endpoint: &str) -> String {
        let session = ChatSession::new(endpoint);
        let session_id = session.session_id.clone();
        self.sessions
            .entry(endpoint.to_string())
            .or_default()
            .push(session);
        self.session_index
            .insert(session_id.clone(), endpoint.to_string());
        session_id
    }

    /// Idempotently registers an externally supplied session id.
    ///
    /// If the id is already known (under this endpoint or any other), the
    /// existing registration is authoritative and only its `updated_at` is
    /// refreshed. Otherwise a new session record is created.
    pub fn register(&mut self, endpoint: &str, session_id: &str) {
        if self.session_index.contains_key(session_id) {
            self.touch(session_id);
            return;
        }
        self.sessions
            .entry(endpoint.to_string())
            .or_default()
            .push(ChatSession::with_id(endpoint, session_id));
        self.session_index
            .insert(session_id.to_string(), endpoint.to_string());
    }

    /// Refreshes `updated_at` for the given (endpoint, session id) pair.
    ///
    /// When the id is unknown, the server has renamed or continued the
    /// conversation under a new id. If the endpoint holds exactly one
    /// session (legacy single-session layout), that session takes over the
    /// new id in place and the old id is dropped from the reverse index.
    /// Otherwise a fresh record is registered for the new id.
    pub fn refresh(&mut self, endpoint: &str, session_id: &str) {
        if self.session_index.contains_key(session_id) {
            self.touch(session_id);
            return;
        }
        let single_session = self
            .sessions
            .get(endpoint)
            .is_some_and(|list| list.len() == 1);
        if !single_session {
            self.register(endpoint, session_id);
            return;
        }
        if let Some(list) = self.sessions.get_mut(endpoint) {
            let session = &mut list[0];
            let old_id = std::mem::replace(&mut session.session_id, session_id.to_string());
            session.touch();
            self.session_index.remove(&old_id);
            self.session_index
                .insert(session_id.to_string(), endpoint.to_string());
        }
    }

    /// Removes a session wherever it is registered.
    ///
    /// Idempotent: removing an unknown id is a no-op. The endpoint's entry
    /// disappears entirely once its last session is removed. Returns true
    /// if anything changed.
    pub fn remove(&mut self, session_id: &str) -> bool {
        let Some(endpoint) = self.session_index.remove(session_id) else {
            return false;
        };
        if let Some(list) = self.sessions.get_mut(&endpoint) {
            list.retain(|session| session.session_id != session_id);
            if list.is_empty() {
                self.sessions.remove(&endpoint);
            }
        }
        true
    }

    /// Reverse lookup from session id to endpoint URL.
    pub fn endpoint_for(&self, session_id: &str) -> Option<&str> {
        self.session_index.get(session_id).map(String::as_str)
    }

    /// All sessions across all endpoints, most recently updated first.
    pub fn list_all(&self) -> Vec<ChatSession> {
        let mut all: Vec<ChatSession> = self.sessions.values().flatten().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    /// Sessions for one endpoint, most recently updated first.
    pub fn list_by_endpoint(&self, endpoint: &str) -> Vec<ChatSession> {
        let mut list = self.sessions.get(endpoint).cloned().unwrap_or_default();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        list
    }

    /// The most recently updated session for an endpoint, if any.
    pub fn most_recent(&self, endpoint: &str) -> Option<ChatSession> {
        self.list_by_endpoint(endpoint).into_iter().next()
    }

    /// Patches display metadata and bumps `updated_at`.
    ///
    /// Returns false (no-op) when the session id is unknown.
    pub fn update_metadata(
        &mut self,
        session_id: &str,
        title: Option<String>,
        last_message: Option<String>,
    ) -> bool {
        let Some(session) = self.find_mut(session_id) else {
            return false;
        };
        if let Some(title) = title {
            session.title = Some(title);
        }
        if let Some(last_message) = last_message {
            session.last_message = Some(last_message);
        }
        session.touch();
        true
    }

    fn touch(&mut self, session_id: &str) {
        if let Some(session) = self.find_mut(session_id) {
            session.touch();
        }
    }

    fn find_mut(&mut self, session_id: &str) -> Option<&mut ChatSession> {
        let endpoint = self.session_index.get(session_id)?.clone();
        self.sessions
            .get_mut(&endpoint)?
            .iter_mut()
            .find(|session| session.session_id == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://x/webhook";
    const OTHER: &str = "https://y/webhook";

    #[test]
    fn test_create_registers_both_maps() {
        let mut registry = SessionRegistry::new();
        let id = registry.create(ENDPOINT);

        assert_eq!(registry.endpoint_for(&id), Some(ENDPOINT));
        assert_eq!(registry.list_by_endpoint(ENDPOINT).len(), 1);
    }

    #[test]
    fn test_create_supports_multiple_sessions_per_endpoint() {
        let mut registry = SessionRegistry::new();
        let first = registry.create(ENDPOINT);
        let second = registry.create(ENDPOINT);

        assert_ne!(first, second);
        assert_eq!(registry.list_by_endpoint(ENDPOINT).len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent_and_drops_empty_endpoints() {
        let mut registry = SessionRegistry::new();
        let id = registry.create(ENDPOINT);

        assert!(registry.remove(&id));
        assert_eq!(registry.endpoint_for(&id), None);
        assert!(registry.list_by_endpoint(ENDPOINT).is_empty());
        assert!(registry.is_empty());

        // Removing again is a no-op, never a panic
        assert!(!registry.remove(&id));
        assert!(!registry.remove("unknown-session"));
    }

    #[test]
    fn test_register_conflict_keeps_existing_endpoint() {
        let mut registry = SessionRegistry::new();
        let id = registry.create(ENDPOINT);

        // The same id shared against a different endpoint must not be
        // duplicated; the existing registration wins.
        registry.register(OTHER, &id);

        assert_eq!(registry.endpoint_for(&id), Some(ENDPOINT));
        assert!(registry.list_by_endpoint(OTHER).is_empty());
        assert_eq!(registry.list_by_endpoint(ENDPOINT).len(), 1);
    }

    #[test]
    fn test_refresh_renames_single_session_in_place() {
        let mut registry = SessionRegistry::new();
        let old_id = registry.create(ENDPOINT);

        registry.refresh(ENDPOINT, "server-assigned-id");

        assert_eq!(registry.endpoint_for(&old_id), None);
        assert_eq!(
            registry.endpoint_for("server-assigned-id"),
            Some(ENDPOINT)
        );
        // The record itself survived the rename
        let sessions = registry.list_by_endpoint(ENDPOINT);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "server-assigned-id");
    }

    #[test]
    fn test_refresh_appends_when_multiple_sessions_exist() {
        let mut registry = SessionRegistry::new();
        registry.create(ENDPOINT);
        registry.create(ENDPOINT);

        registry.refresh(ENDPOINT, "server-assigned-id");

        assert_eq!(registry.list_by_endpoint(ENDPOINT).len(), 3);
        assert_eq!(
            registry.endpoint_for("server-assigned-id"),
            Some(ENDPOINT)
        );
    }

    #[test]
    fn test_update_metadata_unknown_id_is_noop() {
        let mut registry = SessionRegistry::new();
        assert!(!registry.update_metadata("nope", Some("t".into()), None));
    }

    #[test]
    fn test_update_metadata_patches_and_bumps() {
        let mut registry = SessionRegistry::new();
        let id = registry.create(ENDPOINT);

        assert!(registry.update_metadata(&id, Some("Greetings".into()), Some("hello!".into())));

        let session = registry.most_recent(ENDPOINT).unwrap();
        assert_eq!(session.title.as_deref(), Some("Greetings"));
        assert_eq!(session.last_message.as_deref(), Some("hello!"));
        assert!(session.updated_at >= session.created_at);
    }

    #[test]
    fn test_from_sessions_rebuilds_reverse_index() {
        let mut registry = SessionRegistry::new();
        let id = registry.create(ENDPOINT);
        registry.create(OTHER);

        let rebuilt = SessionRegistry::from_sessions(registry.sessions().clone());
        assert_eq!(rebuilt.endpoint_for(&id), Some(ENDPOINT));
        assert_eq!(rebuilt.list_all().len(), 2);
    }
}
