//! Selection of the packages that must survive pruning of a new managed
//! profile.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use mp_core::ports::{AccessibilityPort, InputMethodError, InputMethodPort, PackageManagerPort};
use mp_core::{PackageName, PackageQuery, PackageRecord, ProfileIdentity};

/// Package identifiers kept on a new managed profile. Rebuilt on every
/// pruning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredPackageSet(HashSet<PackageName>);

impl RequiredPackageSet {
    pub fn contains(&self, package: &PackageName) -> bool {
        self.0.contains(package)
    }

    pub fn insert(&mut self, package: PackageName) -> bool {
        self.0.insert(package)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether an installed package with `record` stays on the profile.
    ///
    /// Depends only on set membership, the "required for all users" flag and
    /// the managed-profile bit.
    pub fn keeps(&self, record: &PackageRecord) -> bool {
        self.contains(&record.package_name)
            || record.required_for_all_users
            || record.is_required_for_managed_profile()
    }
}

impl FromIterator<PackageName> for RequiredPackageSet {
    fn from_iter<I: IntoIterator<Item = PackageName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<PackageName> for RequiredPackageSet {
    fn extend<I: IntoIterator<Item = PackageName>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

/// Computes the [`RequiredPackageSet`] of a profile: the platform allow-list,
/// the managing app, the default input methods and the installed
/// accessibility services, the last two restricted to system packages.
pub struct RequiredPackageSelector {
    package_manager: Arc<dyn PackageManagerPort>,
    input_methods: Arc<dyn InputMethodPort>,
    accessibility: Arc<dyn AccessibilityPort>,
    allow_list: Vec<PackageName>,
}

impl RequiredPackageSelector {
    pub fn new(
        package_manager: Arc<dyn PackageManagerPort>,
        input_methods: Arc<dyn InputMethodPort>,
        accessibility: Arc<dyn AccessibilityPort>,
        allow_list: Vec<PackageName>,
    ) -> Self {
        Self {
            package_manager,
            input_methods,
            accessibility,
            allow_list,
        }
    }

    pub async fn compute_required(
        &self,
        profile: &ProfileIdentity,
        managing_package: &PackageName,
    ) -> RequiredPackageSet {
        let mut required: RequiredPackageSet = self.allow_list.iter().cloned().collect();
        required.insert(managing_package.clone());
        required.extend(self.input_method_packages(profile).await);
        required.extend(self.accessibility_packages(profile).await);

        debug!(
            profile = %profile.id,
            required = required.len(),
            "computed required packages"
        );
        required
    }

    /// Original or updated system package on `profile`. Lookup failures and
    /// missing records classify as not system.
    pub async fn is_system_package(
        &self,
        package: &PackageName,
        profile: &ProfileIdentity,
    ) -> bool {
        match self
            .package_manager
            .package_info(package, PackageQuery::NONE, profile.id)
            .await
        {
            Ok(Some(record)) => record.is_system(),
            Ok(None) => false,
            Err(err) => {
                error!(
                    package = %package,
                    error = %err,
                    "package lookup failed, treating as non-system"
                );
                false
            }
        }
    }

    async fn input_method_packages(&self, profile: &ProfileIdentity) -> Vec<PackageName> {
        let methods = match self.input_methods.input_methods().await {
            Ok(methods) => methods,
            Err(err) => {
                warn!(error = %err, "failed to list input methods");
                return Vec::new();
            }
        };

        let mut packages = Vec::new();
        for method in methods {
            let is_default = match self.input_methods.is_default(&method).await {
                Ok(is_default) => is_default,
                Err(InputMethodError::NoDefault) => false,
                Err(err) => {
                    warn!(
                        input_method = %method.id,
                        error = %err,
                        "failed to resolve default input method"
                    );
                    false
                }
            };
            if is_default && self.is_system_package(&method.package_name, profile).await {
                packages.push(method.package_name);
            }
        }
        packages
    }

    async fn accessibility_packages(&self, profile: &ProfileIdentity) -> Vec<PackageName> {
        let services = match self.accessibility.installed_services().await {
            Ok(services) => services,
            Err(err) => {
                warn!(error = %err, "failed to list accessibility services");
                return Vec::new();
            }
        };

        let mut packages = Vec::new();
        for service in services {
            if self.is_system_package(&service.package_name, profile).await {
                packages.push(service.package_name);
            }
        }
        packages
    }
}
