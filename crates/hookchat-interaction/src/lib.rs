//! HTTP interaction layer for the Hookchat engine.
//!
//! Provides [`WebhookAgent`], the reqwest-backed implementation of the
//! core `ChatTransport` trait, plus the wire payload types and the codec
//! that normalizes heterogeneous upstream responses.

pub mod attachment;
pub mod codec;
pub mod config;
pub mod payload;
pub mod webhook_agent;

pub use attachment::attachment_from_path;
pub use config::WebhookConfig;
pub use webhook_agent::WebhookAgent;
