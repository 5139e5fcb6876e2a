//! UI adapter that reports through the log.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{error, info};

use mp_core::ports::ProvisioningUiPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    Error,
    AlreadyProvisioned,
    Finished,
}

/// Logs every presentation request and remembers it for later inspection.
#[derive(Debug, Default)]
pub struct LoggingUi {
    events: Mutex<Vec<UiEvent>>,
}

impl LoggingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn record(&self, event: UiEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl ProvisioningUiPort for LoggingUi {
    async fn show_error(&self) {
        error!("provisioning failed, showing error dialog");
        self.record(UiEvent::Error);
    }

    async fn show_already_provisioned(&self) {
        info!("a managed profile is already present on this device");
        self.record(UiEvent::AlreadyProvisioned);
    }

    async fn finish(&self) {
        info!("provisioning screen closed");
        self.record(UiEvent::Finished);
    }
}
