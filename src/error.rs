use std::path::PathBuf;
use thiserror::Error;

/// Main player error type
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("CLI parse error: {0}")]
    Parse(#[from] crate::cli::ParseError),
}

impl PlayerError {
    /// Get user-friendly error message with suggested solutions
    pub fn user_message(&self) -> String {
        match self {
            PlayerError::Control(err) => err.user_message(),
            PlayerError::Engine(err) => err.user_message(),
            PlayerError::Config(err) => err.user_message(),
            PlayerError::Library(err) => err.user_message(),
            PlayerError::File(err) => format!("File system error: {}", err),
            PlayerError::Parse(err) => format!("Command error: {}", err),
        }
    }

    /// Get suggested recovery actions for the error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PlayerError::Control(err) => err.recovery_suggestions(),
            PlayerError::Engine(err) => err.recovery_suggestions(),
            PlayerError::Config(err) => err.recovery_suggestions(),
            PlayerError::Library(err) => err.recovery_suggestions(),
            PlayerError::File(_) => vec!["Check that the path exists and is readable".to_string()],
            PlayerError::Parse(_) => vec!["Type 'help' to see available commands".to_string()],
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlayerError::Control(ControlError::NoActiveChannel) => ErrorSeverity::Info,
            PlayerError::Control(ControlError::NotFound { .. }) => ErrorSeverity::Error,
            PlayerError::Control(ControlError::EngineCallFailed { .. }) => ErrorSeverity::Error,
            PlayerError::Control(ControlError::InvalidValue { .. }) => ErrorSeverity::Warning,
            PlayerError::Engine(_) => ErrorSeverity::Critical,
            PlayerError::Config(_) => ErrorSeverity::Warning,
            PlayerError::Library(_) => ErrorSeverity::Warning,
            PlayerError::File(_) => ErrorSeverity::Error,
            PlayerError::Parse(_) => ErrorSeverity::Info,
        }
    }
}

/// Error severity levels for logging and user feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
            ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

/// Status reported by the audio engine boundary
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Stream not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid or stale handle")]
    InvalidHandle,

    #[error("Unsupported stream {path}: {reason}")]
    Unsupported { path: PathBuf, reason: String },

    #[error("Invalid parameter index: {index}")]
    InvalidParameter { index: usize },

    #[error("Engine call failed: {op}")]
    Failed { op: &'static str },
}

impl EngineError {
    pub fn user_message(&self) -> String {
        match self {
            EngineError::NotFound { path } => {
                format!("Cannot open audio file: {}", path.display())
            }
            EngineError::InvalidHandle => {
                "The audio engine no longer knows this sound, channel or effect".to_string()
            }
            EngineError::Unsupported { path, reason } => {
                format!("File '{}' cannot be streamed: {}", path.display(), reason)
            }
            EngineError::InvalidParameter { index } => {
                format!("Effect has no parameter #{}", index)
            }
            EngineError::Failed { op } => format!("Audio engine rejected '{}'", op),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            EngineError::NotFound { .. } => vec![
                "Check that the file path is correct".to_string(),
                "Try using absolute path instead of relative path".to_string(),
            ],
            EngineError::Unsupported { .. } => vec![
                "Check if the file extension matches the actual format".to_string(),
            ],
            EngineError::InvalidHandle => vec!["Start playback again".to_string()],
            EngineError::InvalidParameter { .. } | EngineError::Failed { .. } => {
                vec!["Try the operation again".to_string()]
            }
        }
    }
}

/// Errors raised by the transport, volume and effect controllers
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControlError {
    #[error("Engine call '{op}' failed: {source}")]
    EngineCallFailed {
        op: &'static str,
        #[source]
        source: EngineError,
    },

    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("No active channel")]
    NoActiveChannel,

    #[error("Invalid value for '{op}': {value}")]
    InvalidValue { op: &'static str, value: f32 },
}

impl ControlError {
    /// Classify an engine status returned by `op`
    pub fn engine(op: &'static str, source: EngineError) -> Self {
        match source {
            EngineError::NotFound { path } => ControlError::NotFound { path },
            source => ControlError::EngineCallFailed { op, source },
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ControlError::EngineCallFailed { source, .. } => source.user_message(),
            ControlError::NotFound { path } => {
                format!("Cannot find audio file: {}", path.display())
            }
            ControlError::NoActiveChannel => {
                "Nothing is loaded - select or play a track first".to_string()
            }
            ControlError::InvalidValue { value, .. } => {
                format!("{} is not a usable number", value)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ControlError::EngineCallFailed { source, .. } => source.recovery_suggestions(),
            ControlError::NotFound { .. } => vec![
                "Check that the file path is correct".to_string(),
                "Use 'list' to see added files".to_string(),
            ],
            ControlError::NoActiveChannel => vec![
                "Use 'play <path>' or 'select <n>' to load a track".to_string(),
            ],
            ControlError::InvalidValue { .. } => {
                vec!["Pass a finite number".to_string()]
            }
        }
    }
}

/// Track list errors
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Unsupported extension: {path} (expected .{expected})")]
    UnsupportedExtension { path: String, expected: String },

    #[error("Invalid index: {index}")]
    InvalidIndex { index: usize },
}

impl LibraryError {
    pub fn user_message(&self) -> String {
        match self {
            LibraryError::UnsupportedExtension { path, expected } => {
                format!("'{}' is not a .{} file", path, expected)
            }
            LibraryError::InvalidIndex { index } => {
                format!("Track number {} is not in the list", index + 1)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            LibraryError::UnsupportedExtension { expected, .. } => vec![
                format!("Only .{} files can be added to the list", expected),
                "Use 'play <path>' to open other files directly".to_string(),
            ],
            LibraryError::InvalidIndex { .. } => {
                vec!["Use 'list' to see valid track numbers".to_string()]
            }
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ConfigDirNotFound => {
                "Cannot find or create configuration directory".to_string()
            }
            ConfigError::IoError(err) => {
                format!("Cannot access configuration file: {}", err)
            }
            ConfigError::SerializationError(_) => {
                "Failed to save configuration settings".to_string()
            }
            ConfigError::DeserializationError(_) => {
                "Configuration file is corrupted or has invalid format".to_string()
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::ConfigDirNotFound => vec![
                "Check that you have write permissions to your home directory".to_string(),
                "Try creating the directory manually: ~/.config/eq-player/".to_string(),
            ],
            ConfigError::IoError(_) => vec![
                "Check file permissions for the configuration directory".to_string(),
                "Ensure the disk is not full".to_string(),
            ],
            ConfigError::SerializationError(_) => vec![
                "Configuration will use default values".to_string(),
            ],
            ConfigError::DeserializationError(_) => vec![
                "Delete the configuration file to reset to defaults".to_string(),
                "Check the configuration file format manually".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_engine_not_found_maps_to_control_not_found() {
        let err = ControlError::engine(
            "create_stream",
            EngineError::NotFound { path: PathBuf::from("missing.mp3") },
        );
        assert_eq!(err, ControlError::NotFound { path: PathBuf::from("missing.mp3") });
    }

    #[test]
    fn test_other_engine_errors_map_to_call_failed() {
        let err = ControlError::engine("set_position", EngineError::InvalidHandle);
        match err {
            ControlError::EngineCallFailed { op, source } => {
                assert_eq!(op, "set_position");
                assert_eq!(source, EngineError::InvalidHandle);
            }
            other => panic!("Expected EngineCallFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_control_error_display() {
        assert_eq!(format!("{}", ControlError::NoActiveChannel), "No active channel");

        let err = ControlError::EngineCallFailed {
            op: "get_volume",
            source: EngineError::Failed { op: "get_volume" },
        };
        assert_eq!(
            format!("{}", err),
            "Engine call 'get_volume' failed: Engine call failed: get_volume"
        );
    }

    #[test]
    fn test_severity_levels() {
        let info: PlayerError = ControlError::NoActiveChannel.into();
        assert_eq!(info.severity(), ErrorSeverity::Info);
        assert_eq!(info.severity().log_level(), log::Level::Info);

        let error: PlayerError = ControlError::NotFound { path: PathBuf::from("a.mp3") }.into();
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert_eq!(error.severity().as_str(), "ERROR");
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = PlayerError::Control(ControlError::EngineCallFailed {
            op: "set_bypass",
            source: EngineError::InvalidHandle,
        });

        let mut current: &dyn Error = &err;
        let mut depth = 0;
        while let Some(source) = current.source() {
            current = source;
            depth += 1;
        }
        assert_eq!(depth, 2);
    }

    #[test]
    fn test_config_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied");
        let config_error: ConfigError = io_error.into();
        assert!(matches!(config_error, ConfigError::IoError(_)));

        let player_error: PlayerError = config_error.into();
        assert!(format!("{}", player_error).contains("Configuration error"));
    }

    #[test]
    fn test_user_messages_and_suggestions() {
        let err = PlayerError::Library(LibraryError::InvalidIndex { index: 4 });
        assert_eq!(err.user_message(), "Track number 5 is not in the list");
        assert!(!err.recovery_suggestions().is_empty());

        let err = PlayerError::Control(ControlError::NoActiveChannel);
        assert!(err.user_message().contains("Nothing is loaded"));
    }
}
