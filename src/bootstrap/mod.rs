//! Startup wiring for the `managed-provisioning` binary.

pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use tracing::init_tracing_subscriber;
pub use wiring::{load_device, resolve_fixture_path, wire_provisioning};
