//! Provisioning orchestrator.
//!
//! Runs the privileged provisioning steps strictly in order and stops at the
//! first fatal failure:
//!
//! 1. create the managed profile (fatal)
//! 2. delete non-required packages from it (never fatal)
//! 3. install the managing app onto it (fatal)
//! 4. make the managing app its profile owner (fatal)
//! 5. remove the managing app from the calling user (never fatal)
//! 6. send the provisioning-complete broadcast to the profile (never fatal)
//!
//! Nothing is rolled back when a later step fails: the profile, pruned
//! packages and the installed managing app stay as they are.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};

use mp_core::ports::{
    BroadcastPort, DevicePolicyPort, PackageManagerPort, ProvisioningUiPort, UserManagerPort,
};
use mp_core::{
    Broadcast, DeleteFlags, InstallFailure, InstallStatus, PackageName, ProfileIdentity,
    ProvisioningError, ProvisioningRequest, ProvisioningStep, UserFlags, WorkflowOutcome,
};

use crate::usecases::prune_packages::DeleteNonRequiredPackages;

/// Orchestrator that drives a single provisioning run.
///
/// Not re-entrant. Callers must not start a second run while one is in
/// progress.
pub struct ProvisioningOrchestrator {
    user_manager: Arc<dyn UserManagerPort>,
    package_manager: Arc<dyn PackageManagerPort>,
    device_policy: Arc<dyn DevicePolicyPort>,
    broadcasts: Arc<dyn BroadcastPort>,
    ui: Arc<dyn ProvisioningUiPort>,
    delete_non_required: Arc<DeleteNonRequiredPackages>,
}

impl ProvisioningOrchestrator {
    pub fn new(
        user_manager: Arc<dyn UserManagerPort>,
        package_manager: Arc<dyn PackageManagerPort>,
        device_policy: Arc<dyn DevicePolicyPort>,
        broadcasts: Arc<dyn BroadcastPort>,
        ui: Arc<dyn ProvisioningUiPort>,
        delete_non_required: Arc<DeleteNonRequiredPackages>,
    ) -> Self {
        Self {
            user_manager,
            package_manager,
            device_policy,
            broadcasts,
            ui,
            delete_non_required,
        }
    }

    pub async fn run(&self, request: &ProvisioningRequest) -> WorkflowOutcome {
        let span = info_span!(
            "usecase.provisioning.run",
            managing_package = %request.managing_package(),
            profile_name = %request.profile_name(),
        );
        async {
            info!("starting managed profile provisioning");
            match self.provision(request).await {
                Ok(profile) => {
                    info!(profile = %profile.id, "finishing managed profile provisioning");
                    self.ui.finish().await;
                    WorkflowOutcome::Success(profile)
                }
                Err(err) => {
                    warn!(
                        step = %err.step(),
                        error = %err,
                        cause = ?std::error::Error::source(&err).map(ToString::to_string),
                        "could not finish managed profile provisioning"
                    );
                    self.ui.show_error().await;
                    WorkflowOutcome::Failed(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn provision(
        &self,
        request: &ProvisioningRequest,
    ) -> Result<ProfileIdentity, ProvisioningError> {
        let managing_package = request.managing_package();

        let profile = self.create_profile(request.profile_name()).await?;
        self.delete_non_required_packages(&profile, managing_package)
            .await;
        self.install_managing_app(&profile, managing_package).await?;
        self.set_profile_owner(&profile, managing_package, request.profile_name())
            .await?;
        self.remove_managing_app_from_origin(managing_package).await;
        self.send_provisioning_complete(&profile).await;

        Ok(profile)
    }

    async fn create_profile(
        &self,
        profile_name: &str,
    ) -> Result<ProfileIdentity, ProvisioningError> {
        debug!(profile_name = %profile_name, "creating managed profile");

        let parent = self
            .user_manager
            .current_user()
            .await
            .map_err(|err| ProvisioningError::subsystem(ProvisioningStep::CreateProfile, err))?;

        let created = self
            .user_manager
            .create_related_user(profile_name, UserFlags::MANAGED_PROFILE, parent)
            .await
            .map_err(|err| ProvisioningError::subsystem(ProvisioningStep::CreateProfile, err))?;

        match created {
            Some(info) => {
                info!(profile = %info.id, serial = %info.serial_number, "managed profile created");
                Ok(ProfileIdentity::from(&info))
            }
            None => Err(ProvisioningError::CreationFailed {
                user_limit_reached: self.user_limit_reached().await,
            }),
        }
    }

    async fn user_limit_reached(&self) -> bool {
        let counts = async {
            let max = self.user_manager.max_supported_users().await?;
            let count = self.user_manager.user_count().await?;
            anyhow::Ok((max, count))
        };
        match counts.await {
            Ok((max, count)) => max == count,
            Err(err) => {
                error!(error = %err, "failed to read user counts after profile creation failure");
                false
            }
        }
    }

    async fn delete_non_required_packages(
        &self,
        profile: &ProfileIdentity,
        managing_package: &PackageName,
    ) {
        let report = self
            .delete_non_required
            .execute(profile, managing_package)
            .await;
        if !report.failed.is_empty() {
            warn!(
                step = %ProvisioningStep::DeleteNonRequiredApps,
                failed = ?report.failed,
                "some non-required packages could not be deleted"
            );
        }
    }

    async fn install_managing_app(
        &self,
        profile: &ProfileIdentity,
        managing_package: &PackageName,
    ) -> Result<(), ProvisioningError> {
        debug!(package = %managing_package, "installing managing app on managed profile");

        let status = self
            .package_manager
            .install_existing_package_as_user(managing_package, profile.id)
            .await
            .map_err(|err| {
                ProvisioningError::subsystem(ProvisioningStep::InstallManagingApp, err)
            })?;

        if status == InstallStatus::SUCCEEDED {
            return Ok(());
        }
        Err(ProvisioningError::InstallFailed(InstallFailure::from_status(status)))
    }

    async fn set_profile_owner(
        &self,
        profile: &ProfileIdentity,
        managing_package: &PackageName,
        owner_name: &str,
    ) -> Result<(), ProvisioningError> {
        debug!(package = %managing_package, "setting managing app as profile owner");

        let accepted = self
            .device_policy
            .set_profile_owner(managing_package, owner_name, profile.id)
            .await
            .map_err(|err| ProvisioningError::subsystem(ProvisioningStep::SetProfileOwner, err))?;

        if !accepted {
            warn!(package = %managing_package, "could not set profile owner");
            return Err(ProvisioningError::OwnershipFailed);
        }
        Ok(())
    }

    async fn remove_managing_app_from_origin(&self, managing_package: &PackageName) {
        debug!(package = %managing_package, "removing managing app from calling user");

        let removal = async {
            let origin = self.user_manager.calling_user().await?;
            self.package_manager
                .delete_package_as_user(managing_package, origin, DeleteFlags::NONE)
                .await
        };
        if let Err(err) = removal.await {
            error!(
                step = %ProvisioningStep::RemoveManagingAppFromOrigin,
                package = %managing_package,
                error = %err,
                "unexpected failure removing managing app from calling user"
            );
        }
    }

    async fn send_provisioning_complete(&self, profile: &ProfileIdentity) {
        let step = ProvisioningStep::SendProvisioningComplete;

        let handle = match self
            .user_manager
            .user_for_serial_number(profile.serial_number)
            .await
        {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                error!(
                    step = %step,
                    serial = %profile.serial_number,
                    "no user for profile serial number"
                );
                return;
            }
            Err(err) => {
                error!(
                    step = %step,
                    serial = %profile.serial_number,
                    error = %err,
                    "failed to resolve profile user handle"
                );
                return;
            }
        };

        let broadcast = Broadcast::provisioning_complete();
        match self
            .broadcasts
            .send_broadcast_as_user(&broadcast, handle)
            .await
        {
            Ok(()) => info!(
                user = %handle.identifier(),
                action = %broadcast.action,
                "provisioning complete broadcast sent"
            ),
            Err(err) => error!(
                step = %step,
                error = %err,
                "failed to send provisioning complete broadcast"
            ),
        }
    }
}
