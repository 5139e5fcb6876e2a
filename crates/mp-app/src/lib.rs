//! Managed provisioning application layer
//!
//! This crate contains the provisioning use cases and the orchestration of
//! the privileged steps that turn a device into one with a managed profile.

pub mod deps;
pub mod usecases;

pub use deps::ProvisioningDeps;
pub use usecases::{
    DeleteNonRequiredPackages, ProvisioningFlow, ProvisioningOrchestrator, PruneReport,
    RequiredPackageSelector, RequiredPackageSet, ValidateProvisioningRequest,
};
