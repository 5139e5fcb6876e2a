//! Assembles the provisioning flow on top of a [`SimulatedDevice`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use mp_app::{ProvisioningDeps, ProvisioningFlow};
use mp_core::config::AppConfig;
use mp_core::ports::ConsentPort;
use mp_core::PackageName;
use mp_infra::{DeviceFixture, LoggingUi, SimulatedDevice};

/// Fixture paths in the config are relative to the config file.
pub fn resolve_fixture_path(config_path: &Path, fixture: &Path) -> PathBuf {
    if fixture.is_absolute() {
        return fixture.to_path_buf();
    }
    config_path
        .parent()
        .map(|dir| dir.join(fixture))
        .unwrap_or_else(|| fixture.to_path_buf())
}

/// Load the device described by `config`'s fixture.
pub fn load_device(config_path: &Path, config: &AppConfig) -> anyhow::Result<SimulatedDevice> {
    if config.device_fixture.as_os_str().is_empty() {
        anyhow::bail!("No device fixture configured in {}", config_path.display());
    }
    let path = resolve_fixture_path(config_path, &config.device_fixture);
    let fixture = DeviceFixture::load(&path)
        .with_context(|| format!("Failed to load device fixture: {}", path.display()))?;
    let device = SimulatedDevice::from_fixture(&fixture)
        .with_context(|| format!("Invalid device fixture: {}", path.display()))?;
    info!(fixture = %path.display(), users = device.users().len(), "device loaded");
    Ok(device)
}

/// Wire a [`ProvisioningFlow`] whose system ports are all served by `device`.
pub fn wire_provisioning(
    config: &AppConfig,
    device: Arc<SimulatedDevice>,
    consent: Arc<dyn ConsentPort>,
    ui: Arc<LoggingUi>,
) -> ProvisioningFlow {
    let required_apps = config
        .required_apps
        .iter()
        .map(|name| PackageName::from(name.as_str()))
        .collect();

    ProvisioningFlow::from_deps(ProvisioningDeps {
        user_manager: device.clone(),
        package_manager: device.clone(),
        device_policy: device.clone(),
        input_methods: device.clone(),
        accessibility: device.clone(),
        broadcasts: device,
        consent,
        ui,
        required_apps,
    })
}
