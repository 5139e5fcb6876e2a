//! Device fixture: the initial state of a [`SimulatedDevice`](super::SimulatedDevice),
//! read from TOML.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read device fixture {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse device fixture")]
    Parse(#[from] toml::de::Error),

    #[error("user {user} lists unknown package {package}")]
    UnknownPackage { user: i32, package: String },

    #[error("fixture has no user {0}")]
    UnknownUser(i32),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DeviceFixture {
    pub max_users: usize,
    #[serde(default)]
    pub foreground_user: i32,
    /// Defaults to the foreground user.
    #[serde(default)]
    pub calling_user: Option<i32>,
    #[serde(default)]
    pub users: Vec<UserFixture>,
    #[serde(default)]
    pub packages: Vec<PackageFixture>,
    #[serde(default)]
    pub input_methods: Vec<InputMethodFixture>,
    /// Id of the default input method. `None` means no default is set.
    #[serde(default)]
    pub default_input_method: Option<String>,
    #[serde(default)]
    pub accessibility_services: Vec<AccessibilityServiceFixture>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserFixture {
    pub id: i32,
    pub serial_number: i32,
    pub name: String,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub parent: Option<i32>,
    /// Packages installed for this user.
    #[serde(default)]
    pub packages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackageFixture {
    pub name: String,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub updated_system: bool,
    #[serde(default)]
    pub required_for_all_users: bool,
    #[serde(default)]
    pub required_for_managed_profile: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InputMethodFixture {
    pub id: String,
    pub package: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AccessibilityServiceFixture {
    pub service: String,
    pub package: String,
}

impl DeviceFixture {
    pub fn from_toml_str(content: &str) -> Result<Self, FixtureError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FIXTURE: &str = r#"
        max_users = 4
        foreground_user = 0
        default_input_method = "com.android.inputmethod.latin/.LatinIME"

        [[users]]
        id = 0
        serial_number = 0
        name = "Owner"
        flags = 0x13
        packages = ["com.android.launcher", "com.example.mdm"]

        [[packages]]
        name = "com.android.launcher"
        system = true

        [[packages]]
        name = "com.example.mdm"

        [[input_methods]]
        id = "com.android.inputmethod.latin/.LatinIME"
        package = "com.android.inputmethod.latin"

        [[accessibility_services]]
        service = "com.android.talkback/.TalkBackService"
        package = "com.android.talkback"
    "#;

    #[test]
    fn parses_fixture_with_defaults() {
        let fixture = DeviceFixture::from_toml_str(FIXTURE).unwrap();

        assert_eq!(fixture.max_users, 4);
        assert_eq!(fixture.calling_user, None);
        assert_eq!(fixture.users.len(), 1);
        assert_eq!(fixture.users[0].flags, 0x13);
        assert_eq!(fixture.users[0].parent, None);
        assert!(fixture.packages[0].system);
        assert!(!fixture.packages[1].system);
        assert!(!fixture.packages[1].required_for_all_users);
        assert_eq!(
            fixture.input_methods[0].package,
            "com.android.inputmethod.latin"
        );
        assert_eq!(fixture.accessibility_services.len(), 1);
    }

    #[test]
    fn loads_fixture_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let fixture = DeviceFixture::load(file.path()).unwrap();

        assert_eq!(fixture.users[0].name, "Owner");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = DeviceFixture::load(Path::new("/nonexistent/device.toml")).unwrap_err();
        match err {
            FixtureError::Io { path, .. } => assert_eq!(path, "/nonexistent/device.toml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = DeviceFixture::from_toml_str("max_users = ").unwrap_err();
        assert!(matches!(err, FixtureError::Parse(_)));
    }
}
