use crate::provisioning::{IntakeError, ProfileIdentity, ProvisioningError};

/// Terminal result of one orchestrator run.
#[derive(Debug)]
pub enum WorkflowOutcome {
    Success(ProfileIdentity),
    Failed(ProvisioningError),
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Success(_))
    }

    pub fn profile(&self) -> Option<ProfileIdentity> {
        match self {
            WorkflowOutcome::Success(profile) => Some(*profile),
            WorkflowOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ProvisioningError> {
        match self {
            WorkflowOutcome::Success(_) => None,
            WorkflowOutcome::Failed(err) => Some(err),
        }
    }
}

/// Terminal result of a whole provisioning flow, from intake to completion.
#[derive(Debug)]
pub enum FlowOutcome {
    Provisioned(ProfileIdentity),
    Failed(ProvisioningError),
    InvalidRequest(IntakeError),
    /// The calling user already has a managed profile; nothing was asked or changed.
    AlreadyProvisioned,
    ConsentDeclined,
    ConsentCancelled,
}

impl FlowOutcome {
    /// Whether the flow ended without an error being shown.
    pub fn is_clean_exit(&self) -> bool {
        matches!(
            self,
            Self::Provisioned(_) | Self::ConsentDeclined | Self::ConsentCancelled
        )
    }
}

impl From<WorkflowOutcome> for FlowOutcome {
    fn from(outcome: WorkflowOutcome) -> Self {
        match outcome {
            WorkflowOutcome::Success(profile) => FlowOutcome::Provisioned(profile),
            WorkflowOutcome::Failed(err) => FlowOutcome::Failed(err),
        }
    }
}
