use std::fmt::{Display, Formatter};

use crate::ids::PackageName;
use crate::package::InstallStatus;

/// The fatal steps and side steps of a provisioning run, used to tag logs
/// and subsystem failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisioningStep {
    CreateProfile,
    DeleteNonRequiredApps,
    InstallManagingApp,
    SetProfileOwner,
    RemoveManagingAppFromOrigin,
    SendProvisioningComplete,
}

impl Display for ProvisioningStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProvisioningStep::CreateProfile => "create_profile",
            ProvisioningStep::DeleteNonRequiredApps => "delete_non_required_apps",
            ProvisioningStep::InstallManagingApp => "install_managing_app",
            ProvisioningStep::SetProfileOwner => "set_profile_owner",
            ProvisioningStep::RemoveManagingAppFromOrigin => "remove_managing_app_from_origin",
            ProvisioningStep::SendProvisioningComplete => "send_provisioning_complete",
        };
        f.write_str(name)
    }
}

/// Why installing the managing application onto the profile failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InstallFailure {
    #[error("the user is restricted")]
    UserRestricted,
    #[error("the package could not be found")]
    PackageNotFound,
    #[error("unknown status: {0}")]
    Status(InstallStatus),
}

impl InstallFailure {
    /// Maps a non-success install status to its failure kind.
    pub fn from_status(status: InstallStatus) -> Self {
        match status {
            InstallStatus::FAILED_USER_RESTRICTED => InstallFailure::UserRestricted,
            InstallStatus::FAILED_INVALID_URI => InstallFailure::PackageNotFound,
            other => InstallFailure::Status(other),
        }
    }
}

/// Fatal provisioning failure. Aborts the remaining steps of a run.
///
/// Kept separate from port errors so that an unrelated failure is never
/// mistaken for a provisioning abort.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    #[error("{}", creation_failure_message(*user_limit_reached))]
    CreationFailed { user_limit_reached: bool },

    #[error("could not install managing app on managed profile: {0}")]
    InstallFailed(InstallFailure),

    #[error("could not set profile owner")]
    OwnershipFailed,

    #[error("{step} failed")]
    Subsystem {
        step: ProvisioningStep,
        #[source]
        source: anyhow::Error,
    },
}

fn creation_failure_message(user_limit_reached: bool) -> &'static str {
    if user_limit_reached {
        "user creation failed, maximum number of users reached"
    } else {
        "couldn't create related user, reason unknown"
    }
}

impl ProvisioningError {
    pub fn subsystem(step: ProvisioningStep, source: anyhow::Error) -> Self {
        ProvisioningError::Subsystem { step, source }
    }

    pub fn is_user_limit_reached(&self) -> bool {
        matches!(
            self,
            ProvisioningError::CreationFailed {
                user_limit_reached: true
            }
        )
    }

    /// The step that failed.
    pub fn step(&self) -> ProvisioningStep {
        match self {
            ProvisioningError::CreationFailed { .. } => ProvisioningStep::CreateProfile,
            ProvisioningError::InstallFailed(_) => ProvisioningStep::InstallManagingApp,
            ProvisioningError::OwnershipFailed => ProvisioningStep::SetProfileOwner,
            ProvisioningError::Subsystem { step, .. } => *step,
        }
    }
}

/// Rejected provisioning input. Detected before the orchestrator runs.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("missing managing package name")]
    MissingManagingPackage,

    #[error("missing managed profile name")]
    MissingProfileName,

    #[error("managing package {0} is not installed")]
    ManagingPackageNotInstalled(PackageName),

    #[error("failed to look up managing package {package}")]
    PackageLookupFailed {
        package: PackageName,
        #[source]
        source: anyhow::Error,
    },
}
