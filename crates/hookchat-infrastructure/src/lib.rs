//! File-backed persistence for the Hookchat engine.
//!
//! Implements the core repository traits over TOML files in a local data
//! directory (default `~/.hookchat`): the versioned session registry blob
//! and the bounded per-session transcript cache.

pub mod dto;
pub mod storage;
pub mod toml_registry_repository;
pub mod toml_transcript_repository;

pub use crate::toml_registry_repository::TomlRegistryRepository;
pub use crate::toml_transcript_repository::{
    DEFAULT_TRANSCRIPT_CAPACITY, TomlTranscriptRepository,
};
