use anyhow::Result;
use async_trait::async_trait;

use crate::provisioning::Broadcast;
use crate::user::UserHandle;

#[async_trait]
pub trait BroadcastPort: Send + Sync {
    /// Deliver `broadcast` to receivers running as `handle` only.
    async fn send_broadcast_as_user(&self, broadcast: &Broadcast, handle: UserHandle)
        -> Result<()>;
}
