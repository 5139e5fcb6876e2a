use anyhow::Result;
use async_trait::async_trait;

use crate::ids::{PackageName, UserId};

/// Device policy ownership.
#[async_trait]
pub trait DevicePolicyPort: Send + Sync {
    /// Make `package` the profile owner of `user`, labelled `owner_name`.
    ///
    /// Returns `Ok(false)` if the policy subsystem refused.
    async fn set_profile_owner(
        &self,
        package: &PackageName,
        owner_name: &str,
        user: UserId,
    ) -> Result<bool>;
}
