use crate::flags::impl_flags;

/// Sent to the new profile once provisioning has finished.
pub const ACTION_PROVISIONING_COMPLETE: &str =
    "android.managedprovisioning.ACTION_PROVISIONING_COMPLETE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BroadcastFlags(u32);

impl BroadcastFlags {
    /// Deliver to receivers in packages that are currently stopped.
    pub const INCLUDE_STOPPED_PACKAGES: BroadcastFlags = BroadcastFlags(0x20);
}

impl_flags!(BroadcastFlags);

/// Out-of-process notification scoped to a single user handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub action: String,
    pub flags: BroadcastFlags,
}

impl Broadcast {
    pub fn provisioning_complete() -> Self {
        Self {
            action: ACTION_PROVISIONING_COMPLETE.to_string(),
            flags: BroadcastFlags::INCLUDE_STOPPED_PACKAGES,
        }
    }
}
