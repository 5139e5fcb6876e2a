use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use mp_core::ports::PackageManagerPort;
use mp_core::{DeleteFlags, PackageName, PackageQuery, ProfileIdentity};

use crate::usecases::required_packages::RequiredPackageSelector;

/// What a pruning pass did. Logged only; it never fails a provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub kept: Vec<PackageName>,
    pub deleted: Vec<PackageName>,
    /// Packages whose delete was attempted and failed.
    pub failed: Vec<PackageName>,
}

/// Use case for removing every package from a new managed profile that is
/// not required there.
///
/// Each package is decided and deleted on its own, one after another. There
/// is no batching and no transaction.
pub struct DeleteNonRequiredPackages {
    package_manager: Arc<dyn PackageManagerPort>,
    selector: Arc<RequiredPackageSelector>,
}

impl DeleteNonRequiredPackages {
    pub fn new(
        package_manager: Arc<dyn PackageManagerPort>,
        selector: Arc<RequiredPackageSelector>,
    ) -> Self {
        Self {
            package_manager,
            selector,
        }
    }

    pub async fn execute(
        &self,
        profile: &ProfileIdentity,
        managing_package: &PackageName,
    ) -> PruneReport {
        let span = info_span!(
            "usecase.delete_non_required_packages.execute",
            profile = %profile.id,
        );
        async {
            let mut report = PruneReport::default();

            let apps = match self
                .package_manager
                .installed_applications(profile.id)
                .await
            {
                Ok(apps) => apps,
                Err(err) => {
                    error!(error = %err, "failed to list installed applications on profile");
                    return report;
                }
            };

            let required = self
                .selector
                .compute_required(profile, managing_package)
                .await;

            for app in apps {
                let record = match self
                    .package_manager
                    .package_info(&app.package_name, PackageQuery::GET_SIGNATURES, profile.id)
                    .await
                {
                    Ok(Some(record)) => record,
                    Ok(None) => {
                        error!(
                            package = %app.package_name,
                            "no package record for installed application, keeping it"
                        );
                        report.kept.push(app.package_name);
                        continue;
                    }
                    Err(err) => {
                        error!(
                            package = %app.package_name,
                            error = %err,
                            "package lookup failed, keeping it"
                        );
                        report.kept.push(app.package_name);
                        continue;
                    }
                };

                if required.keeps(&record) {
                    report.kept.push(app.package_name);
                    continue;
                }

                match self
                    .package_manager
                    .delete_package_as_user(
                        &app.package_name,
                        profile.id,
                        DeleteFlags::DELETE_SYSTEM_APP,
                    )
                    .await
                {
                    Ok(()) => {
                        debug!(package = %app.package_name, "deleted non-required package");
                        report.deleted.push(app.package_name);
                    }
                    Err(err) => {
                        error!(
                            package = %app.package_name,
                            error = %err,
                            "failed to delete non-required package"
                        );
                        report.failed.push(app.package_name);
                    }
                }
            }

            info!(
                kept = report.kept.len(),
                deleted = report.deleted.len(),
                failed = report.failed.len(),
                "pruned managed profile packages"
            );
            report
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use mp_core::ports::mocks::{MockAccessibility, MockInputMethods, MockPackageManager};
    use mp_core::{
        ApplicationFlags, ApplicationInfo, PackageRecord, RequiredForProfile, SerialNumber, UserId,
    };

    const PROFILE: ProfileIdentity = ProfileIdentity {
        id: UserId::new(10),
        serial_number: SerialNumber::new(4),
    };

    fn app(package: &str) -> ApplicationInfo {
        ApplicationInfo {
            package_name: PackageName::from(package),
            flags: ApplicationFlags::SYSTEM,
        }
    }

    fn record(package: &str) -> PackageRecord {
        PackageRecord {
            package_name: PackageName::from(package),
            required_for_all_users: package == "com.android.phone",
            required_for_profile: if package == "com.android.keychain" {
                RequiredForProfile::MANAGED_PROFILE
            } else {
                RequiredForProfile::empty()
            },
            application_info: Some(app(package)),
        }
    }

    fn use_case(packages: MockPackageManager, allow_list: &[&str]) -> DeleteNonRequiredPackages {
        let packages: Arc<dyn PackageManagerPort> = Arc::new(packages);
        let mut methods = MockInputMethods::new();
        methods.expect_input_methods().returning(|| Ok(Vec::new()));
        let mut services = MockAccessibility::new();
        services
            .expect_installed_services()
            .returning(|| Ok(Vec::new()));
        let selector = RequiredPackageSelector::new(
            packages.clone(),
            Arc::new(methods),
            Arc::new(services),
            allow_list.iter().map(|p| PackageName::from(*p)).collect(),
        );
        DeleteNonRequiredPackages::new(packages, Arc::new(selector))
    }

    #[tokio::test]
    async fn deletes_only_non_required_packages() {
        let mut packages = MockPackageManager::new();
        packages.expect_installed_applications().returning(|_| {
            Ok(vec![
                app("com.example.mdm"),
                app("com.android.contacts"),
                app("com.android.phone"),
                app("com.android.keychain"),
                app("com.android.launcher"),
                app("com.android.camera"),
            ])
        });
        packages
            .expect_package_info()
            .returning(|package, _, _| Ok(Some(record(package.as_str()))));
        packages
            .expect_delete_package_as_user()
            .withf(|package, user, flags| {
                matches!(package.as_str(), "com.android.launcher" | "com.android.camera")
                    && *user == PROFILE.id
                    && *flags == DeleteFlags::DELETE_SYSTEM_APP
            })
            .times(2)
            .returning(|_, _, _| Ok(()));

        let report = use_case(packages, &["com.android.contacts"])
            .execute(&PROFILE, &PackageName::from("com.example.mdm"))
            .await;

        assert_eq!(
            report.deleted,
            vec![
                PackageName::from("com.android.launcher"),
                PackageName::from("com.android.camera")
            ]
        );
        assert_eq!(report.kept.len(), 4);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn record_lookups_request_signatures() {
        let mut packages = MockPackageManager::new();
        packages
            .expect_installed_applications()
            .returning(|_| Ok(vec![app("com.example.mdm")]));
        packages
            .expect_package_info()
            .withf(|_, query, _| *query == PackageQuery::GET_SIGNATURES)
            .times(1)
            .returning(|package, _, _| Ok(Some(record(package.as_str()))));
        packages.expect_delete_package_as_user().never();

        use_case(packages, &[])
            .execute(&PROFILE, &PackageName::from("com.example.mdm"))
            .await;
    }

    #[tokio::test]
    async fn delete_failures_are_reported_and_do_not_stop_the_pass() {
        let mut seq = Sequence::new();
        let mut packages = MockPackageManager::new();
        packages
            .expect_installed_applications()
            .returning(|_| Ok(vec![app("com.android.launcher"), app("com.android.camera")]));
        packages
            .expect_package_info()
            .returning(|package, _, _| Ok(Some(record(package.as_str()))));
        packages
            .expect_delete_package_as_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(anyhow::anyhow!("delete refused")));
        packages
            .expect_delete_package_as_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let report = use_case(packages, &[])
            .execute(&PROFILE, &PackageName::from("com.example.mdm"))
            .await;

        assert_eq!(
            report.failed,
            vec![PackageName::from("com.android.launcher")]
        );
        assert_eq!(
            report.deleted,
            vec![PackageName::from("com.android.camera")]
        );
    }

    #[tokio::test]
    async fn unreadable_records_are_kept() {
        let mut packages = MockPackageManager::new();
        packages
            .expect_installed_applications()
            .returning(|_| Ok(vec![app("com.android.gone"), app("com.android.broken")]));
        packages.expect_package_info().returning(|package, _, _| {
            if package.as_str() == "com.android.gone" {
                Ok(None)
            } else {
                Err(anyhow::anyhow!("binder died"))
            }
        });
        packages.expect_delete_package_as_user().never();

        let report = use_case(packages, &[])
            .execute(&PROFILE, &PackageName::from("com.example.mdm"))
            .await;

        assert_eq!(report.kept.len(), 2);
        assert!(report.deleted.is_empty());
    }

    #[tokio::test]
    async fn enumeration_failure_deletes_nothing() {
        let mut packages = MockPackageManager::new();
        packages
            .expect_installed_applications()
            .returning(|_| Err(anyhow::anyhow!("package service unavailable")));
        packages.expect_delete_package_as_user().never();

        let report = use_case(packages, &[])
            .execute(&PROFILE, &PackageName::from("com.example.mdm"))
            .await;

        assert_eq!(report, PruneReport::default());
    }
}
