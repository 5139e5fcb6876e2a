//! Provisioning flow: intake, consent and orchestration.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};

use mp_core::ports::{ConsentPort, ProvisioningUiPort, UserManagerPort};
use mp_core::{ConsentDecision, FlowOutcome, ProvisioningParams};

use crate::deps::ProvisioningDeps;
use crate::usecases::orchestrator::ProvisioningOrchestrator;
use crate::usecases::prune_packages::DeleteNonRequiredPackages;
use crate::usecases::required_packages::RequiredPackageSelector;
use crate::usecases::validate_request::ValidateProvisioningRequest;

/// Entry point of a provisioning attempt.
///
/// Validates the request, refuses devices that already have a managed
/// profile, waits for consent and only then hands over to the
/// [`ProvisioningOrchestrator`]. No subsystem is mutated before consent is
/// granted.
pub struct ProvisioningFlow {
    validate_request: ValidateProvisioningRequest,
    user_manager: Arc<dyn UserManagerPort>,
    consent: Arc<dyn ConsentPort>,
    ui: Arc<dyn ProvisioningUiPort>,
    orchestrator: Arc<ProvisioningOrchestrator>,
}

impl ProvisioningFlow {
    pub fn new(
        validate_request: ValidateProvisioningRequest,
        user_manager: Arc<dyn UserManagerPort>,
        consent: Arc<dyn ConsentPort>,
        ui: Arc<dyn ProvisioningUiPort>,
        orchestrator: Arc<ProvisioningOrchestrator>,
    ) -> Self {
        Self {
            validate_request,
            user_manager,
            consent,
            ui,
            orchestrator,
        }
    }

    /// Wire the whole flow from grouped ports.
    pub fn from_deps(deps: ProvisioningDeps) -> Self {
        let selector = Arc::new(RequiredPackageSelector::new(
            deps.package_manager.clone(),
            deps.input_methods,
            deps.accessibility,
            deps.required_apps,
        ));
        let delete_non_required = Arc::new(DeleteNonRequiredPackages::new(
            deps.package_manager.clone(),
            selector,
        ));
        let orchestrator = Arc::new(ProvisioningOrchestrator::new(
            deps.user_manager.clone(),
            deps.package_manager.clone(),
            deps.device_policy,
            deps.broadcasts,
            deps.ui.clone(),
            delete_non_required,
        ));
        let validate_request =
            ValidateProvisioningRequest::new(deps.package_manager, deps.user_manager.clone());

        Self::new(
            validate_request,
            deps.user_manager,
            deps.consent,
            deps.ui,
            orchestrator,
        )
    }

    pub async fn start(&self, params: ProvisioningParams) -> FlowOutcome {
        let span = info_span!("usecase.provisioning_flow.start");
        async {
            let request = match self.validate_request.execute(params).await {
                Ok(request) => request,
                Err(err) => {
                    error!(error = %err, "invalid provisioning request");
                    self.ui.show_error().await;
                    return FlowOutcome::InvalidRequest(err);
                }
            };

            if self.already_has_managed_profile().await {
                info!("managed profile already present");
                self.ui.show_already_provisioned().await;
                return FlowOutcome::AlreadyProvisioned;
            }

            match self.wait_for_consent().await {
                ConsentDecision::Answered { consented: true } => {}
                ConsentDecision::Answered { consented: false } => {
                    info!("user did not consent to profile creation, cancelling provisioning");
                    self.ui.finish().await;
                    return FlowOutcome::ConsentDeclined;
                }
                ConsentDecision::Cancelled => {
                    info!("user consent cancelled");
                    self.ui.finish().await;
                    return FlowOutcome::ConsentCancelled;
                }
            }

            self.orchestrator.run(&request).await.into()
        }
        .instrument(span)
        .await
    }

    async fn already_has_managed_profile(&self) -> bool {
        let related = async {
            let user = self.user_manager.calling_user().await?;
            self.user_manager.related_users(user).await
        };
        match related.await {
            Ok(users) => users.iter().any(|user| user.is_managed_profile()),
            Err(err) => {
                error!(error = %err, "failed to list related users, assuming no managed profile");
                false
            }
        }
    }

    async fn wait_for_consent(&self) -> ConsentDecision {
        debug!("waiting for user consent");
        let receiver = self.consent.request_consent().await;
        match receiver.await {
            Ok(decision) => decision,
            Err(_) => {
                debug!("consent prompt closed without a decision");
                ConsentDecision::Cancelled
            }
        }
    }
}
