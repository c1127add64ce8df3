//! Global daybook configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, DaybookResult};

static DEFAULT_DATA_DIR: &str = "~/daybook";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

/// Configuration at ~/.config/daybook/config.toml, overridable with
/// `DAYBOOK_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DaybookConfig {
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        DaybookConfig {
            data_dir: default_data_dir(),
            current_user: None,
            gemini_api_key: None,
            gemini_model: None,
        }
    }
}

impl DaybookConfig {
    pub fn config_path() -> DaybookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DaybookError::Config("Could not determine config directory".into()))?
            .join("daybook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config file
    /// on first run.
    pub fn load() -> DaybookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DaybookResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DAYBOOK"))
            .build()
            .map_err(|e| DaybookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DaybookError::Config(e.to_string()))
    }

    /// Where documents are stored, with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn save_to(&self, path: &Path) -> DaybookResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DaybookError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaybookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| DaybookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Record the signed-in user in the config file.
    ///
    /// Reads the file alone rather than the merged view so environment
    /// overrides such as an API key are not written to disk.
    pub fn set_current_user(path: &Path, user: Option<&str>) -> DaybookResult<()> {
        let mut on_disk: DaybookConfig = match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| DaybookError::Config(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DaybookConfig::default(),
            Err(e) => {
                return Err(DaybookError::Config(format!("Could not read config file: {e}")));
            }
        };
        on_disk.current_user = user.map(String::from);
        on_disk.save_to(path)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DaybookResult<()> {
        let contents = format!(
            "\
# daybook configuration

# Where your calendar data lives:
# data_dir = \"{}\"

# API key for `daybook plan` (or set DAYBOOK_GEMINI_API_KEY):
# gemini_api_key = \"\"

# Model used by `daybook plan`:
# gemini_model = \"gemini-2.0-flash-exp\"
",
            DEFAULT_DATA_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaybookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DaybookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daybook/config.toml");
        DaybookConfig::create_default_config(&path).unwrap();

        let config = DaybookConfig::load_from(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("~/daybook"));
        assert!(config.current_user.is_none());
    }

    #[test]
    fn test_set_current_user_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/tmp/somewhere\"\n").unwrap();

        DaybookConfig::set_current_user(&path, Some("alice")).unwrap();
        let config = DaybookConfig::load_from(&path).unwrap();
        assert_eq!(config.current_user.as_deref(), Some("alice"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/somewhere"));

        DaybookConfig::set_current_user(&path, None).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("current_user"));
    }

    #[test]
    fn test_data_path_expands_tilde() {
        let config = DaybookConfig::default();
        let expanded = config.data_path();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("daybook"));
    }
}
