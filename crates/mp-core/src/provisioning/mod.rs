//! Provisioning domain module.
//!
//! Request, identity, outcome and error types shared by the provisioning
//! use cases and their adapters.

mod broadcast;
mod consent;
mod error;
mod outcome;
mod profile;
mod request;

pub use broadcast::{Broadcast, BroadcastFlags, ACTION_PROVISIONING_COMPLETE};
pub use consent::ConsentDecision;
pub use error::{InstallFailure, IntakeError, ProvisioningError, ProvisioningStep};
pub use outcome::{FlowOutcome, WorkflowOutcome};
pub use profile::ProfileIdentity;
pub use request::{
    ProvisioningParams, ProvisioningRequest, EXTRA_DEFAULT_MANAGED_PROFILE_NAME,
    EXTRA_MDM_PACKAGE_NAME,
};
