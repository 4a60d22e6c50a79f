//! Layered settings
//!
//! Settings are resolved in order: built-in defaults, the global
//! `config.toml` in the user data directory, an explicit `--config` file,
//! then `APICONF_*` environment variables. Later layers only override the
//! fields they set.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TRANSFORM_URL: &str = "http://localhost:5555/transform";
pub const DEFAULT_CAMARA_RAW_BASE: &str = "https://raw.githubusercontent.com/camaraproject";

const CONFIG_FILE_NAME: &str = "config.toml";

pub fn get_global_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "apiconf", "apiconf")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Endpoint of the converter generation service
    pub transform_url: String,
    pub request_timeout_secs: u64,
    pub deploy_delay_ms: u64,
    pub deployment_test_delay_ms: u64,
    /// Base of raw CAMARA definition downloads
    pub camara_raw_base: String,
    /// Explicit log filter overriding the verbosity flags
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            transform_url: DEFAULT_TRANSFORM_URL.to_string(),
            request_timeout_secs: 120,
            deploy_delay_ms: 2000,
            deployment_test_delay_ms: 1000,
            camara_raw_base: DEFAULT_CAMARA_RAW_BASE.to_string(),
            log_level: None,
        }
    }
}

/// A settings file. Every field is optional so a file only overrides what it names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    transform_url: Option<String>,
    request_timeout_secs: Option<u64>,
    deploy_delay_ms: Option<u64>,
    deployment_test_delay_ms: Option<u64>,
    camara_raw_base: Option<String>,
    log_level: Option<String>,
}

impl Settings {
    /// Resolve settings from every layer.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Ok(dir) = get_global_config_dir() {
            let global = dir.join(CONFIG_FILE_NAME);
            if global.exists() {
                debug!(path = %global.display(), "Loading global settings");
                settings.merge_file(&global)?;
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Loading settings file");
            settings.merge_file(path)?;
        }

        settings.merge_env_vars()?;
        Ok(settings)
    }

    /// Apply a TOML settings file on top of the current values.
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.merge_toml(&content)
    }

    pub fn merge_toml(&mut self, content: &str) -> Result<()> {
        let file: SettingsFile = toml::from_str(content)?;
        if let Some(v) = file.transform_url {
            self.transform_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file.deploy_delay_ms {
            self.deploy_delay_ms = v;
        }
        if let Some(v) = file.deployment_test_delay_ms {
            self.deployment_test_delay_ms = v;
        }
        if let Some(v) = file.camara_raw_base {
            self.camara_raw_base = v;
        }
        if file.log_level.is_some() {
            self.log_level = file.log_level;
        }
        Ok(())
    }

    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `APICONF_*` overrides read through `lookup`.
    pub fn merge_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("APICONF_TRANSFORM_URL") {
            self.transform_url = url;
        }
        if let Some(secs) = lookup("APICONF_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("APICONF_REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(ms) = lookup("APICONF_DEPLOY_DELAY_MS") {
            self.deploy_delay_ms = parse_number("APICONF_DEPLOY_DELAY_MS", &ms)?;
        }
        if let Some(level) = lookup("APICONF_LOG_LEVEL") {
            self.log_level = Some(level);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deploy_delay(&self) -> Duration {
        Duration::from_millis(self.deploy_delay_ms)
    }

    pub fn deployment_test_delay(&self) -> Duration {
        Duration::from_millis(self.deployment_test_delay_ms)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transform_url, "http://localhost:5555/transform");
        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
        assert_eq!(settings.deploy_delay(), Duration::from_millis(2000));
        assert_eq!(settings.deployment_test_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_file_overrides_only_named_fields() {
        let mut settings = Settings::default();
        settings
            .merge_toml("transform_url = \"http://gen.internal/transform\"\ndeploy_delay_ms = 0\n")
            .unwrap();

        assert_eq!(settings.transform_url, "http://gen.internal/transform");
        assert_eq!(settings.deploy_delay_ms, 0);
        assert_eq!(settings.request_timeout_secs, 120);
    }

    #[test]
    fn test_unknown_file_field_is_rejected() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.merge_toml("transfrom_url = \"x\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings = Settings::default();
        settings.merge_toml("request_timeout_secs = 30").unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("APICONF_REQUEST_TIMEOUT_SECS", "5"),
            ("APICONF_LOG_LEVEL", "debug"),
        ]);
        settings
            .merge_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_env_number() {
        let mut settings = Settings::default();
        let err = settings
            .merge_env_with(|key| (key == "APICONF_DEPLOY_DELAY_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("APICONF_DEPLOY_DELAY_MS"));
    }

    #[test]
    fn test_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "camara_raw_base = \"http://127.0.0.1:9/raw\"").unwrap();

        let mut settings = Settings::default();
        settings.merge_file(file.path()).unwrap();
        assert_eq!(settings.camara_raw_base, "http://127.0.0.1:9/raw");
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Settings::load(Some(Path::new("/no/such/apiconf.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
