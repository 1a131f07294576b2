//! TOML-based RegistryRepository implementation.

use crate::dto::{RegistryV1_0_0, RegistryV2_0_0};
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use hookchat_core::error::{HookchatError, Result};
use hookchat_core::session::{RegistryRepository, SessionRegistry};
use std::fs;
use std::path::Path;
use version_migrate::{FromDomain, IntoDomain, MigratesTo};

/// Persists the whole session registry as one `registry.toml` blob.
///
/// - Uses DTOs (`RegistryV2_0_0`) for persistence
/// - Handles migration from the V1 single-session-per-endpoint layout
/// - Converts between DTOs and the domain model
///
/// A blob that cannot be parsed under any known schema is treated as
/// absent: the store starts fresh and the next save overwrites it. The
/// registry never blocks startup over a bad file.
pub struct TomlRegistryRepository {
    file: AtomicTomlFile<RegistryV2_0_0>,
}

impl TomlRegistryRepository {
    /// Creates a repository rooted at `base_dir`, creating the directory
    /// if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            file: AtomicTomlFile::new(base_dir.join("registry.toml")),
        })
    }

    /// Creates a repository at the default location (`~/.hookchat`).
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| HookchatError::config("failed to get home directory"))?;
        Self::new(home_dir.join(".hookchat"))
    }

    /// Parses a registry blob, trying the newest schema first and
    /// migrating older layouts forward.
    fn parse(content: &str) -> Result<RegistryV2_0_0> {
        if let Ok(v2) = toml::from_str::<RegistryV2_0_0>(content) {
            return Ok(v2);
        }
        if let Ok(v1) = toml::from_str::<RegistryV1_0_0>(content) {
            tracing::info!("migrating session registry from single-session layout");
            return Ok(v1.migrate());
        }
        Err(HookchatError::migration(
            "unrecognized session registry schema",
        ))
    }
}

#[async_trait]
impl RegistryRepository for TomlRegistryRepository {
    async fn load(&self) -> Result<Option<SessionRegistry>> {
        let Some(content) = self.file.read_raw()? else {
            return Ok(None);
        };
        match Self::parse(&content) {
            Ok(dto) => Ok(Some(dto.into_domain())),
            Err(err) => {
                tracing::warn!("discarding unreadable session registry: {err}");
                Ok(None)
            }
        }
    }

    async fn save(&self, registry: &SessionRegistry) -> Result<()> {
        let dto = RegistryV2_0_0::from_domain(registry.clone());
        self.file.save(&dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ENDPOINT: &str = "https://x/webhook";

    #[tokio::test]
    async fn test_load_without_file_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlRegistryRepository::new(temp_dir.path()).unwrap();

        assert!(repository.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlRegistryRepository::new(temp_dir.path()).unwrap();

        let mut registry = SessionRegistry::new();
        let first = registry.create(ENDPOINT);
        let second = registry.create(ENDPOINT);
        repository.save(&registry).await.unwrap();

        let loaded = repository.load().await.unwrap().unwrap();
        assert_eq!(loaded.endpoint_for(&first), Some(ENDPOINT));
        assert_eq!(loaded.endpoint_for(&second), Some(ENDPOINT));
        assert_eq!(loaded.list_by_endpoint(ENDPOINT).len(), 2);
    }

    #[tokio::test]
    async fn test_legacy_blob_is_migrated() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlRegistryRepository::new(temp_dir.path()).unwrap();

        let legacy = format!(
            r#"
schema_version = 1

[sessions."{ENDPOINT}"]
session_id = "legacy-session"
webhook_url = "{ENDPOINT}"
created_at = "2024-01-01T00:00:00+00:00"
updated_at = "2024-01-01T00:00:00+00:00"
"#
        );
        fs::write(temp_dir.path().join("registry.toml"), legacy).unwrap();

        let loaded = repository.load().await.unwrap().unwrap();
        assert_eq!(loaded.endpoint_for("legacy-session"), Some(ENDPOINT));
        assert_eq!(loaded.list_by_endpoint(ENDPOINT).len(), 1);

        // The next save rewrites the blob under the current schema
        repository.save(&loaded).await.unwrap();
        let rewritten = fs::read_to_string(temp_dir.path().join("registry.toml")).unwrap();
        assert!(rewritten.contains("schema_version = 2"));
        let reloaded = repository.load().await.unwrap().unwrap();
        assert_eq!(reloaded.endpoint_for("legacy-session"), Some(ENDPOINT));
    }

    #[tokio::test]
    async fn test_unreadable_blob_degrades_to_empty() {
        let temp_dir = TempDir::new().unwrap();
        let repository = TomlRegistryRepository::new(temp_dir.path()).unwrap();

        fs::write(temp_dir.path().join("registry.toml"), "sessions = 12").unwrap();

        assert!(repository.load().await.unwrap().is_none());
    }
}
