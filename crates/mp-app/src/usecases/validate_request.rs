use std::sync::Arc;

use tracing::{debug, error};

use mp_core::ports::{PackageManagerPort, UserManagerPort};
use mp_core::{IntakeError, PackageName, PackageQuery, ProvisioningParams, ProvisioningRequest};

/// Use case for turning raw provisioning parameters into a
/// [`ProvisioningRequest`].
///
/// Checks, in order: managing package present, managing package installed
/// for the calling user, profile name present. Any failure means the
/// orchestrator must not run.
pub struct ValidateProvisioningRequest {
    package_manager: Arc<dyn PackageManagerPort>,
    user_manager: Arc<dyn UserManagerPort>,
}

impl ValidateProvisioningRequest {
    pub fn new(
        package_manager: Arc<dyn PackageManagerPort>,
        user_manager: Arc<dyn UserManagerPort>,
    ) -> Self {
        Self {
            package_manager,
            user_manager,
        }
    }

    pub async fn execute(
        &self,
        params: ProvisioningParams,
    ) -> Result<ProvisioningRequest, IntakeError> {
        let package = match params.managing_package.filter(|p| !p.is_empty()) {
            Some(package) => PackageName::from(package),
            None => {
                error!("missing managing package name");
                return Err(IntakeError::MissingManagingPackage);
            }
        };

        self.ensure_installed(&package).await?;

        let profile_name = match params.profile_name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => {
                error!("missing managed profile name");
                return Err(IntakeError::MissingProfileName);
            }
        };

        debug!(package = %package, profile_name = %profile_name, "provisioning request accepted");
        ProvisioningRequest::new(package, profile_name)
    }

    async fn ensure_installed(&self, package: &PackageName) -> Result<(), IntakeError> {
        let lookup = async {
            let user = self.user_manager.calling_user().await?;
            self.package_manager
                .package_info(package, PackageQuery::NONE, user)
                .await
        };

        match lookup.await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                error!(package = %package, "managing package is not installed");
                Err(IntakeError::ManagingPackageNotInstalled(package.clone()))
            }
            Err(err) => {
                error!(package = %package, error = %err, "managing package lookup failed");
                Err(IntakeError::PackageLookupFailed {
                    package: package.clone(),
                    source: err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_core::ports::mocks::{MockPackageManager, MockUserManager};
    use mp_core::{PackageRecord, RequiredForProfile, UserId};

    fn record(package: &str) -> PackageRecord {
        PackageRecord {
            package_name: PackageName::from(package),
            required_for_all_users: false,
            required_for_profile: RequiredForProfile::empty(),
            application_info: None,
        }
    }

    fn user_manager() -> MockUserManager {
        let mut users = MockUserManager::new();
        users.expect_calling_user().returning(|| Ok(UserId::SYSTEM));
        users
    }

    fn use_case(
        packages: MockPackageManager,
        users: MockUserManager,
    ) -> ValidateProvisioningRequest {
        ValidateProvisioningRequest::new(Arc::new(packages), Arc::new(users))
    }

    #[tokio::test]
    async fn accepts_installed_package_and_name() {
        let mut packages = MockPackageManager::new();
        packages
            .expect_package_info()
            .withf(|package, _, user| {
                package.as_str() == "com.example.mdm" && *user == UserId::SYSTEM
            })
            .times(1)
            .returning(|package, _, _| Ok(Some(record(package.as_str()))));

        let request = use_case(packages, user_manager())
            .execute(ProvisioningParams::new("com.example.mdm", "Work"))
            .await
            .unwrap();

        assert_eq!(request.managing_package().as_str(), "com.example.mdm");
        assert_eq!(request.profile_name(), "Work");
    }

    #[tokio::test]
    async fn rejects_missing_or_empty_package_without_lookup() {
        for params in [
            ProvisioningParams {
                managing_package: None,
                profile_name: Some("Work".into()),
            },
            ProvisioningParams::new("", "Work"),
        ] {
            let mut packages = MockPackageManager::new();
            packages.expect_package_info().never();

            let err = use_case(packages, MockUserManager::new())
                .execute(params)
                .await
                .unwrap_err();
            assert!(matches!(err, IntakeError::MissingManagingPackage));
        }
    }

    #[tokio::test]
    async fn rejects_missing_or_empty_profile_name() {
        for params in [
            ProvisioningParams {
                managing_package: Some("com.example.mdm".into()),
                profile_name: None,
            },
            ProvisioningParams::new("com.example.mdm", ""),
        ] {
            let mut packages = MockPackageManager::new();
            packages
                .expect_package_info()
                .returning(|package, _, _| Ok(Some(record(package.as_str()))));

            let err = use_case(packages, user_manager())
                .execute(params)
                .await
                .unwrap_err();
            assert!(matches!(err, IntakeError::MissingProfileName));
        }
    }

    #[tokio::test]
    async fn rejects_package_not_installed() {
        let mut packages = MockPackageManager::new();
        packages.expect_package_info().returning(|_, _, _| Ok(None));

        let err = use_case(packages, user_manager())
            .execute(ProvisioningParams::new("com.example.missing", "Work"))
            .await
            .unwrap_err();

        match err {
            IntakeError::ManagingPackageNotInstalled(package) => {
                assert_eq!(package.as_str(), "com.example.missing")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn lookup_failure_rejects_request() {
        let mut packages = MockPackageManager::new();
        packages
            .expect_package_info()
            .returning(|_, _, _| Err(anyhow::anyhow!("package service unavailable")));

        let err = use_case(packages, user_manager())
            .execute(ProvisioningParams::new("com.example.mdm", "Work"))
            .await
            .unwrap_err();

        assert!(matches!(err, IntakeError::PackageLookupFailed { .. }));
    }
}
