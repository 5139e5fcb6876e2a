use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::provisioning::ConsentDecision;

/// Collects the user's approval before provisioning starts.
#[async_trait]
pub trait ConsentPort: Send + Sync {
    /// Start a consent prompt.
    ///
    /// The receiver is resolved exactly once. A sender dropped without a
    /// decision counts as [`ConsentDecision::Cancelled`].
    async fn request_consent(&self) -> oneshot::Receiver<ConsentDecision>;
}
