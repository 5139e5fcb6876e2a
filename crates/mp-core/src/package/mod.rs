//! Package records as reported by the package-management subsystem.
//!
//! These are read-only projections. Provisioning queries them per user but
//! never mutates them.

use serde::{Deserialize, Serialize};

use crate::flags::impl_flags;
use crate::ids::PackageName;

/// Application flag word (`ApplicationInfo.flags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationFlags(u32);

impl ApplicationFlags {
    /// Shipped as part of the system image.
    pub const SYSTEM: ApplicationFlags = ApplicationFlags(1 << 0);
    /// A system application that has been updated from its shipped version.
    pub const UPDATED_SYSTEM_APP: ApplicationFlags = ApplicationFlags(1 << 7);
}

/// Per-profile "required" bits (`PackageInfo.requiredForProfile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredForProfile(u32);

impl RequiredForProfile {
    pub const MANAGED_PROFILE: RequiredForProfile = RequiredForProfile(0x1);
}

/// Extra information requested from a package lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackageQuery(u32);

impl PackageQuery {
    pub const NONE: PackageQuery = PackageQuery(0);
    pub const GET_SIGNATURES: PackageQuery = PackageQuery(0x40);
}

/// Flags passed to a package delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeleteFlags(u32);

impl DeleteFlags {
    pub const NONE: DeleteFlags = DeleteFlags(0);
    /// Allow removing a system application for the target user only.
    pub const DELETE_SYSTEM_APP: DeleteFlags = DeleteFlags(0x4);
}

impl_flags!(
    ApplicationFlags,
    RequiredForProfile,
    PackageQuery,
    DeleteFlags
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub package_name: PackageName,
    #[serde(default)]
    pub flags: ApplicationFlags,
}

impl ApplicationInfo {
    /// Original or updated system package.
    pub fn is_system(&self) -> bool {
        self.flags
            .intersects(ApplicationFlags::SYSTEM | ApplicationFlags::UPDATED_SYSTEM_APP)
    }
}

/// Installed state of a package for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub package_name: PackageName,
    #[serde(default)]
    pub required_for_all_users: bool,
    #[serde(default)]
    pub required_for_profile: RequiredForProfile,
    #[serde(default)]
    pub application_info: Option<ApplicationInfo>,
}

impl PackageRecord {
    /// A record without application info is never a system package.
    pub fn is_system(&self) -> bool {
        self.application_info
            .as_ref()
            .map(ApplicationInfo::is_system)
            .unwrap_or(false)
    }

    pub fn is_required_for_managed_profile(&self) -> bool {
        self.required_for_profile
            .contains(RequiredForProfile::MANAGED_PROFILE)
    }
}

/// Raw status code returned by an install request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstallStatus(i32);

impl InstallStatus {
    pub const SUCCEEDED: InstallStatus = InstallStatus(1);
    pub const FAILED_INVALID_URI: InstallStatus = InstallStatus(-10);
    pub const FAILED_USER_RESTRICTED: InstallStatus = InstallStatus(-111);

    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An input method registered with the input-method subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMethodInfo {
    pub id: String,
    pub package_name: PackageName,
}

/// An installed accessibility service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityServiceInfo {
    pub service_name: String,
    pub package_name: PackageName,
}
