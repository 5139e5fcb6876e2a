//! Provisioning use cases
//!
//! ProvisioningFlow
//!         ↓
//! ValidateProvisioningRequest  → rejected input never reaches the orchestrator
//!         ↓
//! (already provisioned?) → (consent)
//!         ↓
//! ProvisioningOrchestrator
//!         ├─ create profile
//!         ├─ DeleteNonRequiredPackages ← RequiredPackageSelector
//!         ├─ install managing app
//!         ├─ set profile owner
//!         ├─ remove managing app from origin user
//!         └─ send provisioning complete

pub mod flow;
pub mod orchestrator;
pub mod prune_packages;
pub mod required_packages;
pub mod validate_request;

pub use flow::ProvisioningFlow;
pub use orchestrator::ProvisioningOrchestrator;
pub use prune_packages::{DeleteNonRequiredPackages, PruneReport};
pub use required_packages::{RequiredPackageSelector, RequiredPackageSet};
pub use validate_request::ValidateProvisioningRequest;
