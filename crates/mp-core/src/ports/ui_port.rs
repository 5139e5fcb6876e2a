use async_trait::async_trait;

/// Presentation side of the provisioning flow.
///
/// The failure reason is never passed here; it is only logged.
#[async_trait]
pub trait ProvisioningUiPort: Send + Sync {
    /// Show the generic "provisioning failed" error and close.
    async fn show_error(&self);

    /// Tell the user a managed profile already exists and close.
    async fn show_already_provisioned(&self);

    /// Close without further UI.
    async fn finish(&self);
}
