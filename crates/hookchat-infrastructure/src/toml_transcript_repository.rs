//! TOML-based TranscriptRepository implementation.
//!
//! One file per (endpoint, session) pair:
//!
//! ```text
//! base_dir/
//! └── transcripts/
//!     └── <uuid-v5-of-endpoint-url>/
//!         ├── <session-id>.toml
//!         └── <session-id>.toml
//! ```
//!
//! Endpoint URLs contain characters that do not survive as directory
//! names, so the per-endpoint directory is a UUID derived from the URL.

use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use hookchat_core::error::Result;
use hookchat_core::session::{ChatMessage, TranscriptRepository};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default bound on cached messages per session.
pub const DEFAULT_TRANSCRIPT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TranscriptFile {
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

/// Bounded per-session transcript cache backed by TOML files.
///
/// The cache exists so a conversation reloads instantly without a network
/// round trip. It is best effort only: a missing or corrupt entry is a
/// cache miss, never an error the caller has to handle.
pub struct TomlTranscriptRepository {
    base_dir: PathBuf,
    capacity: usize,
}

impl TomlTranscriptRepository {
    /// Creates a cache rooted at `base_dir` with the default capacity.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(base_dir, DEFAULT_TRANSCRIPT_CAPACITY)
    }

    /// Creates a cache with an explicit per-session message bound.
    pub fn with_capacity(base_dir: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let base_dir = base_dir.as_ref().join("transcripts");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir, capacity })
    }

    /// Creates a cache at the default location (`~/.hookchat`).
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            hookchat_core::HookchatError::config("failed to get home directory")
        })?;
        Self::new(home_dir.join(".hookchat"))
    }

    fn entry_path(&self, endpoint: &str, session_id: &str) -> PathBuf {
        let endpoint_key = Uuid::new_v5(&Uuid::NAMESPACE_URL, endpoint.as_bytes());
        // Session ids are UUIDs in practice, but externally supplied ones
        // may not be; squash anything that is not file-name safe.
        let file_stem: String = session_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir
            .join(endpoint_key.to_string())
            .join(format!("{file_stem}.toml"))
    }
}

#[async_trait]
impl TranscriptRepository for TomlTranscriptRepository {
    async fn load(&self, endpoint: &str, session_id: &str) -> Result<Option<Vec<ChatMessage>>> {
        let path = self.entry_path(endpoint, session_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        match toml::from_str::<TranscriptFile>(&content) {
            Ok(file) => Ok(Some(file.messages)),
            Err(err) => {
                // A corrupt entry is purged so it cannot fail again on the
                // next load.
                tracing::warn!("discarding corrupt transcript cache {:?}: {err}", path);
                let _ = fs::remove_file(&path);
                Ok(None)
            }
        }
    }

    async fn save(
        &self,
        endpoint: &str,
        session_id: &str,
        messages: &[ChatMessage],
    ) -> Result<()> {
        let start = messages.len().saturating_sub(self.capacity);
        let file = TranscriptFile {
            messages: messages[start..].to_vec(),
        };
        AtomicTomlFile::new(self.entry_path(endpoint, session_id)).save(&file)
    }

    async fn clear(&self, endpoint: &str, session_id: &str) -> Result<()> {
        let path = self.entry_path(endpoint, session_id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
