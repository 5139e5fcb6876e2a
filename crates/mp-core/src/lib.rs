//! # mp-core
//!
//! Core domain models and port interfaces for managed profile provisioning.
//!
//! This crate contains pure domain types and the contracts the application
//! layer depends on. It performs no I/O of its own.

pub mod config;
mod flags;
pub mod ids;
pub mod package;
pub mod ports;
pub mod provisioning;
pub mod user;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use ids::{PackageName, SerialNumber, UserId};
pub use package::{
    AccessibilityServiceInfo, ApplicationFlags, ApplicationInfo, DeleteFlags, InputMethodInfo,
    InstallStatus, PackageQuery, PackageRecord, RequiredForProfile,
};
pub use provisioning::{
    Broadcast, BroadcastFlags, ConsentDecision, FlowOutcome, InstallFailure, IntakeError,
    ProfileIdentity, ProvisioningError, ProvisioningParams, ProvisioningRequest, ProvisioningStep,
    WorkflowOutcome,
};
pub use user::{UserFlags, UserHandle, UserInfo};
