use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tagbridge_commands::ChatConfig;
use tracing::info;

const APP_NAME: &str = "tagbridge";

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("config file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to parse config: {0}")]
    ParseError(String),
    #[error("IO error reading config: {0}")]
    IoError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigSaveError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("IO error writing config: {0}")]
    Io(#[from] std::io::Error),
}

fn default_true() -> bool {
    true
}

/// A trigger script declared directly in the config file. Its body runs the
/// `run` command lines, then returns the `determine` values in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub name: String,
    /// Event line, e.g. "on loot generates for:chest"
    pub event: String,
    /// Command lines, run with the event's linked player
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub run: Vec<String>,
    #[serde(default)]
    pub determine: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptingConfig {
    /// Whether scripts are loaded at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub scripts: Vec<ScriptConfig>,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scripts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the data directory
    #[serde(default)]
    pub file: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub scripting: ScriptingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Platform directories for tagbridge (XDG on Linux, AppData on Windows)
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

impl BridgeConfig {
    pub fn config_path() -> Result<PathBuf, ConfigLoadError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigLoadError::NoConfigDir)
    }

    /// Load from the default location
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf, ConfigSaveError> {
        let path = Self::config_path().map_err(|_| ConfigSaveError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigSaveError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self)?;
        fs::write(path, content)?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Config written on first run
    pub fn example() -> Self {
        Self {
            chat: ChatConfig::default(),
            scripting: ScriptingConfig {
                enabled: true,
                scripts: vec![
                    ScriptConfig {
                        name: "chest_bonus".to_string(),
                        event: "on loot generates for:chest".to_string(),
                        run: vec!["narrate \"Something glints inside the chest.\"".to_string()],
                        determine: vec!["LOOT:diamond|bread".to_string()],
                    },
                    ScriptConfig {
                        name: "announce_reload".to_string(),
                        event: "on reload scripts had_error:true".to_string(),
                        run: Vec::new(),
                        determine: Vec::new(),
                    },
                ],
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: BridgeConfig = toml::from_str("").unwrap();
        assert_eq!(config.chat.bystander_range, 5.0);
        assert!(config.scripting.enabled);
        assert!(config.scripting.scripts.is_empty());
        assert!(!config.logging.file);
    }

    #[test]
    fn test_parses_scripts() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [chat]
            bystander_range = 12.5

            [[scripting.scripts]]
            name = "vault"
            event = "on loot generates in:vault"
            determine = ["cancelled"]
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.bystander_range, 12.5);
        assert_eq!(config.scripting.scripts.len(), 1);
        assert_eq!(config.scripting.scripts[0].determine, vec!["cancelled"]);
    }

    #[test]
    fn test_config_path_ends_with_file_name() {
        if let Ok(path) = BridgeConfig::config_path() {
            assert!(path.ends_with("config.toml"));
            assert!(path.to_string_lossy().contains(APP_NAME));
        }
    }
}
