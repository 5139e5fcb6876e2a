//! Port interfaces for the application layer
//!
//! Ports define the contract between the provisioning use cases and the
//! privileged subsystems they drive. Each port is injected as an
//! `Arc<dyn Port>` so that every subsystem can be faked independently.
//!
//! Every call is treated as an atomic, possibly-failing remote call. Which
//! failures are fatal is decided by the use cases, not by the ports.

pub mod accessibility;
pub mod broadcast;
pub mod consent;
pub mod device_policy;
pub mod errors;
pub mod input_method;
pub mod package_manager;
pub mod ui_port;
pub mod user_manager;

#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use accessibility::AccessibilityPort;
pub use broadcast::BroadcastPort;
pub use consent::ConsentPort;
pub use device_policy::DevicePolicyPort;
pub use errors::InputMethodError;
pub use input_method::InputMethodPort;
pub use package_manager::PackageManagerPort;
pub use ui_port::ProvisioningUiPort;
pub use user_manager::UserManagerPort;
