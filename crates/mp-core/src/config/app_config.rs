use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Packages that always survive pruning of a new managed profile.
    /// May be empty; the managing app is added at runtime regardless.
    pub required_apps: Vec<String>,

    /// Directory for log files. Empty means stdout only.
    pub log_directory: PathBuf,

    /// Device fixture file (path info only, no existence check)
    pub device_fixture: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation
    /// or default value logic. Missing values map to empty values.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        Ok(Self {
            required_apps: toml_value
                .get("provisioning")
                .and_then(|p| p.get("required_apps"))
                .and_then(|v| v.as_array())
                .map(|apps| {
                    apps.iter()
                        .filter_map(|v| v.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            log_directory: PathBuf::from(
                toml_value
                    .get("logging")
                    .and_then(|l| l.get("directory"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            ),
            device_fixture: PathBuf::from(
                toml_value
                    .get("device")
                    .and_then(|d| d.get("fixture"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            ),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            required_apps: Vec::new(),
            log_directory: PathBuf::new(),
            device_fixture: PathBuf::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_toml_maps_all_sections() {
        let value: toml::Value = toml::from_str(
            r#"
            [provisioning]
            required_apps = ["com.android.contacts", "com.android.settings"]

            [logging]
            directory = "/var/log/provisioning"

            [device]
            fixture = "device.toml"
            "#,
        )
        .unwrap();

        let config = AppConfig::from_toml(&value).unwrap();

        assert_eq!(
            config.required_apps,
            vec!["com.android.contacts", "com.android.settings"]
        );
        assert_eq!(config.log_directory, PathBuf::from("/var/log/provisioning"));
        assert_eq!(config.device_fixture, PathBuf::from("device.toml"));
    }

    #[test]
    fn from_toml_missing_sections_are_empty() {
        let value: toml::Value = toml::from_str("").unwrap();
        let config = AppConfig::from_toml(&value).unwrap();
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn from_toml_skips_non_string_entries() {
        let value: toml::Value = toml::from_str(
            r#"
            [provisioning]
            required_apps = ["com.android.contacts", 7]
            "#,
        )
        .unwrap();
        let config = AppConfig::from_toml(&value).unwrap();
        assert_eq!(config.required_apps, vec!["com.android.contacts"]);
    }
}
