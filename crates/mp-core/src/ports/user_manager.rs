use anyhow::Result;
use async_trait::async_trait;

use crate::ids::{SerialNumber, UserId};
use crate::user::{UserFlags, UserHandle, UserInfo};

/// User and profile lifecycle.
#[async_trait]
pub trait UserManagerPort: Send + Sync {
    /// Create a user related to `parent`.
    ///
    /// `Ok(None)` means the platform refused to create the user without
    /// giving a reason (for example because the user limit is reached).
    async fn create_related_user(
        &self,
        name: &str,
        flags: UserFlags,
        parent: UserId,
    ) -> Result<Option<UserInfo>>;

    /// The user currently in the foreground.
    async fn current_user(&self) -> Result<UserId>;

    /// The user the provisioning request was issued from.
    async fn calling_user(&self) -> Result<UserId>;

    /// Users and profiles related to `user`, including `user` itself.
    async fn related_users(&self, user: UserId) -> Result<Vec<UserInfo>>;

    async fn user_count(&self) -> Result<usize>;

    async fn max_supported_users(&self) -> Result<usize>;

    /// `None` if no live user carries `serial_number`.
    async fn user_for_serial_number(&self, serial_number: SerialNumber)
        -> Result<Option<UserHandle>>;
}
