use std::collections::HashMap;

use crate::ids::PackageName;
use crate::provisioning::IntakeError;

pub const EXTRA_MDM_PACKAGE_NAME: &str = "mdmPackageName";
/// Used as the profile's display name and as the profile owner label.
pub const EXTRA_DEFAULT_MANAGED_PROFILE_NAME: &str = "defaultManagedProfileName";

/// Raw, unvalidated provisioning parameters as handed over by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningParams {
    pub managing_package: Option<String>,
    pub profile_name: Option<String>,
}

impl ProvisioningParams {
    pub fn new(managing_package: impl Into<String>, profile_name: impl Into<String>) -> Self {
        Self {
            managing_package: Some(managing_package.into()),
            profile_name: Some(profile_name.into()),
        }
    }

    /// Read the parameters from string extras keyed by
    /// [`EXTRA_MDM_PACKAGE_NAME`] and [`EXTRA_DEFAULT_MANAGED_PROFILE_NAME`].
    pub fn from_extras(extras: &HashMap<String, String>) -> Self {
        Self {
            managing_package: extras.get(EXTRA_MDM_PACKAGE_NAME).cloned(),
            profile_name: extras.get(EXTRA_DEFAULT_MANAGED_PROFILE_NAME).cloned(),
        }
    }
}

/// Validated, immutable provisioning input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    managing_package: PackageName,
    profile_name: String,
}

impl ProvisioningRequest {
    /// Checks only that both fields are non-empty. Whether the managing
    /// package is installed is checked by request intake.
    pub fn new(
        managing_package: impl Into<PackageName>,
        profile_name: impl Into<String>,
    ) -> Result<Self, IntakeError> {
        let managing_package = managing_package.into();
        if managing_package.is_empty() {
            return Err(IntakeError::MissingManagingPackage);
        }
        let profile_name = profile_name.into();
        if profile_name.is_empty() {
            return Err(IntakeError::MissingProfileName);
        }
        Ok(Self {
            managing_package,
            profile_name,
        })
    }

    pub fn managing_package(&self) -> &PackageName {
        &self.managing_package
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }
}
