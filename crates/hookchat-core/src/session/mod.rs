//! Session domain module.
//!
//! This module contains all session-related domain models, repository
//! interfaces, and the durable session store.
//!
//! # Module Structure
//!
//! - `message`: transcript message types (`MessageRole`, `ChatMessage`)
//! - `model`: core session domain model (`ChatSession`)
//! - `registry`: in-memory endpoint-to-sessions registry (`SessionRegistry`)
//! - `repository`: persistence traits for the registry and transcripts
//! - `store`: durable session store (`SessionStore`)

mod message;
mod model;
mod registry;
mod repository;
mod store;

// Re-export public API
pub use message::{ChatMessage, MessageRole};
pub use model::ChatSession;
pub use registry::SessionRegistry;
pub use repository::{RegistryRepository, TranscriptRepository};
pub use store::SessionStore;
