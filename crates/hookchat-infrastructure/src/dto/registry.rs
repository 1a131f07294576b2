//! Session registry DTOs and migrations.
//!
//! The persisted registry carries a schema version tag. V1 kept a single
//! session per endpoint; V2 keeps a list per endpoint so that several
//! conversations against the same workflow can coexist. Loading migrates
//! old blobs forward in memory; the next save rewrites them as V2.

use hookchat_core::session::{ChatSession, SessionRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use version_migrate::{FromDomain, IntoDomain, MigratesTo, Versioned};

fn schema_v1() -> u32 {
    1
}

fn schema_v2() -> u32 {
    2
}

/// Persisted form of one session.
///
/// Kept separate from the domain model so the storage layout can evolve
/// without touching business logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session identifier
    pub session_id: String,
    /// The webhook endpoint URL this session belongs to
    pub webhook_url: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Human-readable session title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Preview of the most recent assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl From<&ChatSession> for SessionRecord {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.session_id.clone(),
            webhook_url: session.webhook_url.clone(),
            created_at: session.created_at.clone(),
            updated_at: session.updated_at.clone(),
            title: session.title.clone(),
            last_message: session.last_message.clone(),
        }
    }
}

impl From<SessionRecord> for ChatSession {
    fn from(record: SessionRecord) -> Self {
        Self {
            session_id: record.session_id,
            webhook_url: record.webhook_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
            title: record.title,
            last_message: record.last_message,
        }
    }
}

/// Represents V1.0.0 of the registry schema.
/// Legacy layout with exactly one session per endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct RegistryV1_0_0 {
    /// Schema version tag accompanying the blob
    #[serde(default = "schema_v1")]
    pub schema_version: u32,
    /// One session per endpoint URL
    #[serde(default)]
    pub sessions: HashMap<String, SessionRecord>,
}

/// Represents V2.0.0 of the registry schema.
/// Multiple sessions per endpoint (history sidebar support).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "2.0.0")]
pub struct RegistryV2_0_0 {
    /// Schema version tag accompanying the blob
    #[serde(default = "schema_v2")]
    pub schema_version: u32,
    /// All sessions per endpoint URL
    #[serde(default)]
    pub sessions: HashMap<String, Vec<SessionRecord>>,
}

/// Migration from RegistryV1_0_0 to RegistryV2_0_0.
/// Each legacy entry is wrapped into a one-element list.
impl MigratesTo<RegistryV2_0_0> for RegistryV1_0_0 {
    fn migrate(self) -> RegistryV2_0_0 {
        RegistryV2_0_0 {
            schema_version: schema_v2(),
            sessions: self
                .sessions
                .into_iter()
                .map(|(endpoint, record)| (endpoint, vec![record]))
                .collect(),
        }
    }
}

/// Convert the latest DTO to the domain model.
///
/// The reverse index is not persisted; it is derived from the forward map
/// on load, which keeps the two in lockstep by construction.
impl IntoDomain<SessionRegistry> for RegistryV2_0_0 {
    fn into_domain(self) -> SessionRegistry {
        let sessions = self
            .sessions
            .into_iter()
            .map(|(endpoint, records)| {
                (
                    endpoint,
                    records.into_iter().map(ChatSession::from).collect(),
                )
            })
            .collect();
        SessionRegistry::from_sessions(sessions)
    }
}

/// Convert the domain model to the latest DTO for persistence.
impl FromDomain<SessionRegistry> for RegistryV2_0_0 {
    fn from_domain(registry: SessionRegistry) -> Self {
        RegistryV2_0_0 {
            schema_version: schema_v2(),
            sessions: registry
                .sessions()
                .iter()
                .map(|(endpoint, sessions)| {
                    (
                        endpoint.clone(),
                        sessions.iter().map(SessionRecord::from).collect(),
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(session_id: &str, endpoint: &str) -> SessionRecord {
        SessionRecord {
            session_id: session_id.to_string(),
            webhook_url: endpoint.to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
            title: None,
            last_message: None,
        }
    }

    #[test]
    fn test_v1_entries_are_wrapped_into_lists() {
        let mut sessions = HashMap::new();
        sessions.insert("https://x/webhook".to_string(), record("s1", "https://x/webhook"));

        let v1 = RegistryV1_0_0 {
            schema_version: 1,
            sessions,
        };
        let v2 = v1.migrate();

        assert_eq!(v2.schema_version, 2);
        assert_eq!(v2.sessions["https://x/webhook"].len(), 1);
        assert_eq!(v2.sessions["https://x/webhook"][0].session_id, "s1");
    }

    #[test]
    fn test_domain_round_trip() {
        let mut sessions = HashMap::new();
        sessions.insert(
            "https://x/webhook".to_string(),
            vec![record("s1", "https://x/webhook"), record("s2", "https://x/webhook")],
        );
        let v2 = RegistryV2_0_0 {
            schema_version: 2,
            sessions,
        };

        let registry = v2.clone().into_domain();
        assert_eq!(registry.endpoint_for("s1"), Some("https://x/webhook"));
        assert_eq!(registry.endpoint_for("s2"), Some("https://x/webhook"));

        let back = RegistryV2_0_0::from_domain(registry);
        assert_eq!(back.sessions["https://x/webhook"].len(), 2);
    }
}
