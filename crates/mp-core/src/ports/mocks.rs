//! Mock implementations of the provisioning ports.
//!
//! Built with `mockall` for unit tests that need exact call expectations.
//! Enable the `testing` feature to use them from another crate.

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::oneshot;

use crate::ids::{PackageName, SerialNumber, UserId};
use crate::package::{
    AccessibilityServiceInfo, ApplicationInfo, DeleteFlags, InputMethodInfo, InstallStatus,
    PackageQuery, PackageRecord,
};
use crate::ports::{
    AccessibilityPort, BroadcastPort, ConsentPort, DevicePolicyPort, InputMethodError,
    InputMethodPort, PackageManagerPort, ProvisioningUiPort, UserManagerPort,
};
use crate::provisioning::{Broadcast, ConsentDecision};
use crate::user::{UserFlags, UserHandle, UserInfo};

mock! {
    pub UserManager {}

    #[async_trait]
    impl UserManagerPort for UserManager {
        async fn create_related_user(
            &self,
            name: &str,
            flags: UserFlags,
            parent: UserId,
        ) -> anyhow::Result<Option<UserInfo>>;
        async fn current_user(&self) -> anyhow::Result<UserId>;
        async fn calling_user(&self) -> anyhow::Result<UserId>;
        async fn related_users(&self, user: UserId) -> anyhow::Result<Vec<UserInfo>>;
        async fn user_count(&self) -> anyhow::Result<usize>;
        async fn max_supported_users(&self) -> anyhow::Result<usize>;
        async fn user_for_serial_number(
            &self,
            serial_number: SerialNumber,
        ) -> anyhow::Result<Option<UserHandle>>;
    }
}

mock! {
    pub PackageManager {}

    #[async_trait]
    impl PackageManagerPort for PackageManager {
        async fn installed_applications(
            &self,
            user: UserId,
        ) -> anyhow::Result<Vec<ApplicationInfo>>;
        async fn package_info(
            &self,
            package: &PackageName,
            query: PackageQuery,
            user: UserId,
        ) -> anyhow::Result<Option<PackageRecord>>;
        async fn delete_package_as_user(
            &self,
            package: &PackageName,
            user: UserId,
            flags: DeleteFlags,
        ) -> anyhow::Result<()>;
        async fn install_existing_package_as_user(
            &self,
            package: &PackageName,
            user: UserId,
        ) -> anyhow::Result<InstallStatus>;
    }
}

mock! {
    pub DevicePolicy {}

    #[async_trait]
    impl DevicePolicyPort for DevicePolicy {
        async fn set_profile_owner(
            &self,
            package: &PackageName,
            owner_name: &str,
            user: UserId,
        ) -> anyhow::Result<bool>;
    }
}

mock! {
    pub InputMethods {}

    #[async_trait]
    impl InputMethodPort for InputMethods {
        async fn input_methods(&self) -> Result<Vec<InputMethodInfo>, InputMethodError>;
        async fn is_default(&self, method: &InputMethodInfo) -> Result<bool, InputMethodError>;
    }
}

mock! {
    pub Accessibility {}

    #[async_trait]
    impl AccessibilityPort for Accessibility {
        async fn installed_services(&self) -> anyhow::Result<Vec<AccessibilityServiceInfo>>;
    }
}

mock! {
    pub Broadcasts {}

    #[async_trait]
    impl BroadcastPort for Broadcasts {
        async fn send_broadcast_as_user(
            &self,
            broadcast: &Broadcast,
            handle: UserHandle,
        ) -> anyhow::Result<()>;
    }
}

mock! {
    pub Consent {}

    #[async_trait]
    impl ConsentPort for Consent {
        async fn request_consent(&self) -> oneshot::Receiver<ConsentDecision>;
    }
}

mock! {
    pub Ui {}

    #[async_trait]
    impl ProvisioningUiPort for Ui {
        async fn show_error(&self);
        async fn show_already_provisioned(&self);
        async fn finish(&self);
    }
}
