//! # Provisioning Dependencies
//!
//! This module defines the dependency grouping for flow construction.
//!
//! **Note**: This is NOT a Builder pattern.
//! - No build steps
//! - No default values
//! - No hidden logic
//! - Just parameter grouping

use std::sync::Arc;

use mp_core::ports::*;
use mp_core::PackageName;

/// Provisioning dependency grouping (non-Builder, just parameter grouping)
///
/// All dependencies are required - no defaults, no optional fields.
pub struct ProvisioningDeps {
    // System services
    pub user_manager: Arc<dyn UserManagerPort>,
    pub package_manager: Arc<dyn PackageManagerPort>,
    pub device_policy: Arc<dyn DevicePolicyPort>,
    pub input_methods: Arc<dyn InputMethodPort>,
    pub accessibility: Arc<dyn AccessibilityPort>,
    pub broadcasts: Arc<dyn BroadcastPort>,

    // User interaction
    pub consent: Arc<dyn ConsentPort>,
    pub ui: Arc<dyn ProvisioningUiPort>,

    /// Platform allow-list of packages kept on every managed profile.
    pub required_apps: Vec<PackageName>,
}
