use anyhow::Result;
use async_trait::async_trait;

use crate::package::AccessibilityServiceInfo;

#[async_trait]
pub trait AccessibilityPort: Send + Sync {
    async fn installed_services(&self) -> Result<Vec<AccessibilityServiceInfo>>;
}
