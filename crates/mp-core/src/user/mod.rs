//! User and profile records as reported by the user-management subsystem.

use serde::{Deserialize, Serialize};

use crate::flags::impl_flags;
use crate::ids::{SerialNumber, UserId};

/// Classification flags attached to a user at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserFlags(u32);

impl UserFlags {
    pub const PRIMARY: UserFlags = UserFlags(0x0000_0001);
    pub const ADMIN: UserFlags = UserFlags(0x0000_0002);
    pub const RESTRICTED: UserFlags = UserFlags(0x0000_0008);
    pub const INITIALIZED: UserFlags = UserFlags(0x0000_0010);
    pub const MANAGED_PROFILE: UserFlags = UserFlags(0x0000_0020);
}

impl_flags!(UserFlags);

/// A user or profile known to the user-management subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub serial_number: SerialNumber,
    pub name: String,
    pub flags: UserFlags,
}

impl UserInfo {
    pub fn is_managed_profile(&self) -> bool {
        self.flags.contains(UserFlags::MANAGED_PROFILE)
    }
}

/// Device-wide addressing handle for a user, used to scope broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserHandle(UserId);

impl UserHandle {
    pub const fn of(user: UserId) -> Self {
        Self(user)
    }

    pub const fn identifier(self) -> UserId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn managed_profile_flag_is_detected() {
        let profile = UserInfo {
            id: UserId::new(10),
            serial_number: SerialNumber::new(3),
            name: "Work".into(),
            flags: UserFlags::MANAGED_PROFILE | UserFlags::INITIALIZED,
        };
        assert!(profile.is_managed_profile());

        let owner = UserInfo {
            flags: UserFlags::PRIMARY | UserFlags::ADMIN,
            ..profile
        };
        assert!(!owner.is_managed_profile());
    }
}
