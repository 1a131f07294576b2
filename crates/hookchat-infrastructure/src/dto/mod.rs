//! Persistence DTOs and schema migrations.

mod registry;

pub use registry::{RegistryV1_0_0, RegistryV2_0_0, SessionRecord};
