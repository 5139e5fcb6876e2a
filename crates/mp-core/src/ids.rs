//! ID type wrappers for type safety.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

macro_rules! impl_numeric_id {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub const fn new(raw: i32) -> Self {
                    Self(raw)
                }

                pub const fn get(self) -> i32 {
                    self.0
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<i32> for $name {
                fn from(raw: i32) -> Self {
                    Self(raw)
                }
            }
        )*
    };
}

/// Platform user id. The primary user is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    pub const SYSTEM: UserId = UserId(0);
}

/// Serial number assigned to a user at creation time. Unlike [`UserId`],
/// serial numbers are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumber(i32);

impl_numeric_id!(UserId, SerialNumber);

/// Package identifier, e.g. `com.example.mdm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for PackageName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_round_trips_through_string() {
        let name = PackageName::from("com.example.mdm");
        assert_eq!(name.as_str(), "com.example.mdm");
        assert_eq!(name.to_string(), "com.example.mdm");
        assert!(!name.is_empty());
        assert!(PackageName::new("").is_empty());
    }

    #[test]
    fn numeric_ids_display_raw_value() {
        assert_eq!(UserId::new(10).to_string(), "10");
        assert_eq!(SerialNumber::from(42).get(), 42);
        assert_eq!(UserId::SYSTEM.get(), 0);
    }
}
