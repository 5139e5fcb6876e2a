use serde::{Deserialize, Serialize};

use crate::ids::{SerialNumber, UserId};
use crate::user::UserInfo;

/// Handle to the profile created by a provisioning run.
///
/// Only profile creation produces one; every later step is addressed by it.
/// The profile's lifecycle belongs to the user-management subsystem, so
/// dropping this value does not remove anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileIdentity {
    pub id: UserId,
    pub serial_number: SerialNumber,
}

impl From<&UserInfo> for ProfileIdentity {
    fn from(info: &UserInfo) -> Self {
        Self {
            id: info.id,
            serial_number: info.serial_number,
        }
    }
}
