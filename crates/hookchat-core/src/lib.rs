//! Core domain types for the Hookchat session engine.
//!
//! This crate holds everything the rest of the workspace builds on: the
//! message and session models, the durable session store, the persistence
//! traits, the transport seam, and the shared error type. It knows nothing
//! about HTTP clients or file formats; those live in the interaction and
//! infrastructure crates.

pub mod error;
pub mod session;
pub mod transport;

// Re-export common error type
pub use error::{HookchatError, Result};
