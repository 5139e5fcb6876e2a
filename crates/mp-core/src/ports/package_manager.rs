use anyhow::Result;
use async_trait::async_trait;

use crate::ids::{PackageName, UserId};
use crate::package::{ApplicationInfo, DeleteFlags, InstallStatus, PackageQuery, PackageRecord};

/// Package install, query and removal, per user.
#[async_trait]
pub trait PackageManagerPort: Send + Sync {
    async fn installed_applications(&self, user: UserId) -> Result<Vec<ApplicationInfo>>;

    /// `Ok(None)` if the package is not installed for `user`.
    async fn package_info(
        &self,
        package: &PackageName,
        query: PackageQuery,
        user: UserId,
    ) -> Result<Option<PackageRecord>>;

    async fn delete_package_as_user(
        &self,
        package: &PackageName,
        user: UserId,
        flags: DeleteFlags,
    ) -> Result<()>;

    /// Make a package that is already on the device available to `user`.
    async fn install_existing_package_as_user(
        &self,
        package: &PackageName,
        user: UserId,
    ) -> Result<InstallStatus>;
}
