//! Conversation orchestration for the Hookchat engine.
//!
//! Hosts [`ChatController`], the state machine that ties the session
//! store, the webhook transport, and the transcript cache together into
//! one live conversation, plus the default wiring in [`bootstrap`].

pub mod bootstrap;
pub mod controller;

pub use bootstrap::{connect_default, connect_in};
pub use controller::{ChatConfig, ChatController, Phase};
