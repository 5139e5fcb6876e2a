//! # Configuration Loader
//!
//! Reads the TOML configuration file and maps it to [`AppConfig`].
//!
//! Pure data loading only: no validation and no defaults. An empty
//! `required_apps` list or a missing `[logging]` section are facts, not
//! errors.

use anyhow::Context;
use std::path::Path;

use mp_core::config::AppConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [provisioning]
            required_apps = ["com.android.contacts"]

            [logging]
            directory = "/var/log/provisioning"

            [device]
            fixture = "device.toml"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.required_apps, vec!["com.android.contacts"]);
        assert_eq!(config.log_directory, PathBuf::from("/var/log/provisioning"));
        assert_eq!(config.device_fixture, PathBuf::from("device.toml"));
    }

    #[test]
    fn test_load_config_returns_empty_values_when_missing() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[provisioning]\n").unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_load_config_fails_on_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[provisioning\nrequired_apps = ")
            .unwrap();

        let err = load_config(temp_file.path()).unwrap_err();

        assert!(err.to_string().contains("Failed to parse config as TOML"));
    }

    #[test]
    fn test_load_config_fails_on_missing_file() {
        let err = load_config(Path::new("/nonexistent/provisioning.toml")).unwrap_err();

        assert!(err
            .to_string()
            .contains("Failed to read config file: /nonexistent/provisioning.toml"));
    }
}
