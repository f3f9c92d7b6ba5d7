use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::controller::ErrorPolicy;
use crate::error::ConfigError;

/// Player configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// What the controllers do with a failed engine call
    pub error_policy: ErrorPolicy,
    /// Step used by `forward`/`back` without an argument
    pub seek_step_ms: u32,
    /// File extension accepted by `add`
    pub media_extension: String,
    /// Ask before leaving the interactive loop
    pub confirm_exit: bool,
    /// Number of control events kept for `history`
    pub event_history: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Ignore,
            seek_step_ms: 5000,
            media_extension: "mp3".to_string(),
            confirm_exit: true,
            event_history: 256,
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config: PlayerConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load from `~/.config/eq-player/config.toml`
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Ok(Self::open(config_path))
    }

    /// Load from an explicit file; a missing file yields the defaults
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = path.into();
        let config = Self::load_config(&config_path)?;
        Ok(Self {
            config,
            config_path,
        })
    }

    fn open(config_path: PathBuf) -> Self {
        let config = match Self::load_config(&config_path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Ignoring unreadable config {}: {}", config_path.display(), err);
                PlayerConfig::default()
            }
        };
        Self {
            config,
            config_path,
        }
    }

    pub fn get_config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn update_config<F>(&mut self, updater: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut PlayerConfig),
    {
        updater(&mut self.config);
        self.save_config()
    }

    pub fn set_error_policy(&mut self, policy: ErrorPolicy) -> Result<(), ConfigError> {
        self.config.error_policy = policy;
        self.save_config()
    }

    pub fn set_seek_step(&mut self, step_ms: u32) -> Result<(), ConfigError> {
        self.config.seek_step_ms = step_ms.max(1);
        self.save_config()
    }

    pub fn set_media_extension(&mut self, extension: &str) -> Result<(), ConfigError> {
        self.config.media_extension = extension.trim_start_matches('.').to_lowercase();
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.config = PlayerConfig::default();
        self.save_config()
    }

    fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::home_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join(".config")
            .join("eq-player");

        std::fs::create_dir_all(&config_dir).map_err(ConfigError::IoError)?;

        Ok(config_dir.join("config.toml"))
    }

    fn load_config(path: &Path) -> Result<PlayerConfig, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(PlayerConfig::default());
        }

        let config_content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: PlayerConfig =
            toml::from_str(&config_content).map_err(ConfigError::DeserializationError)?;

        Ok(config)
    }

    fn save_config(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::IoError)?;
        }

        let config_content =
            toml::to_string_pretty(&self.config).map_err(ConfigError::SerializationError)?;

        std::fs::write(&self.config_path, config_content).map_err(ConfigError::IoError)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        let config_manager = ConfigManager {
            config: PlayerConfig::default(),
            config_path,
        };

        (config_manager, temp_dir)
    }

    #[test]
    fn test_player_config_default() {
        let config = PlayerConfig::default();

        assert_eq!(config.error_policy, ErrorPolicy::Ignore);
        assert_eq!(config.seek_step_ms, 5000);
        assert_eq!(config.media_extension, "mp3");
        assert!(config.confirm_exit);
        assert_eq!(config.event_history, 256);
    }

    #[test]
    fn test_save_and_load_config() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();

        config_manager.config.error_policy = ErrorPolicy::Propagate;
        config_manager.config.seek_step_ms = 2500;
        config_manager.save_config().unwrap();

        let loaded_config = ConfigManager::load_config(&config_manager.config_path).unwrap();
        assert_eq!(loaded_config.error_policy, ErrorPolicy::Propagate);
        assert_eq!(loaded_config.seek_step_ms, 2500);
    }

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().unwrap();
        let nonexistent_path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigManager::load_config(&nonexistent_path).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        fs::write(&config_path, "invalid toml content [[[").unwrap();

        match ConfigManager::load_config(&config_path) {
            Err(ConfigError::DeserializationError(_)) => {}
            other => panic!("Expected DeserializationError, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "error_policy = \"propagate\"\nconfirm_exit = false\n").unwrap();

        let config = ConfigManager::load_config(&config_path).unwrap();
        assert_eq!(config.error_policy, ErrorPolicy::Propagate);
        assert!(!config.confirm_exit);
        assert_eq!(config.seek_step_ms, 5000);
        assert_eq!(config.media_extension, "mp3");
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "error_policy = \"panic\"\n").unwrap();

        assert!(ConfigManager::with_path(&config_path).is_err());
    }

    #[test]
    fn test_with_path_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing").join("config.toml");

        let manager = ConfigManager::with_path(&config_path).unwrap();
        assert_eq!(manager.get_config(), &PlayerConfig::default());
        assert_eq!(manager.config_path(), config_path.as_path());
        assert!(!config_path.exists());
    }

    #[test]
    fn test_update_config() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();

        config_manager
            .update_config(|config| {
                config.confirm_exit = false;
                config.event_history = 16;
            })
            .unwrap();

        let loaded_config = ConfigManager::load_config(&config_manager.config_path).unwrap();
        assert!(!loaded_config.confirm_exit);
        assert_eq!(loaded_config.event_history, 16);
    }

    #[test]
    fn test_setters_normalize() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();

        config_manager.set_seek_step(0).unwrap();
        assert_eq!(config_manager.config.seek_step_ms, 1);

        config_manager.set_media_extension(".WAV").unwrap();
        assert_eq!(config_manager.config.media_extension, "wav");

        config_manager.set_error_policy(ErrorPolicy::Propagate).unwrap();
        assert_eq!(config_manager.config.error_policy, ErrorPolicy::Propagate);
    }

    #[test]
    fn test_reset_to_defaults() {
        let (mut config_manager, _temp_dir) = create_test_config_manager();
        config_manager.config.seek_step_ms = 1;
        config_manager.config.media_extension = "ogg".to_string();

        config_manager.reset_to_defaults().unwrap();
        assert_eq!(config_manager.config, PlayerConfig::default());
    }

    #[test]
    fn test_config_path_creation() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("nested").join("config").join("config.toml");

        let config_manager = ConfigManager {
            config: PlayerConfig::default(),
            config_path: nested_path.clone(),
        };
        config_manager.save_config().unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_toml_format() {
        let toml_string = toml::to_string_pretty(&PlayerConfig::default()).unwrap();

        assert!(toml_string.contains("error_policy = \"ignore\""));
        assert!(toml_string.contains("seek_step_ms = 5000"));
        assert!(toml_string.contains("media_extension = \"mp3\""));
        assert!(toml_string.contains("confirm_exit = true"));
        assert!(toml_string.contains("event_history = 256"));
    }
}
