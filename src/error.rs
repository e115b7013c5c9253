//! Error types for morphcloud.
//!
//! The simulation core never fails. Errors only come from the edges:
//! loading configuration files and gesture capture devices.

use std::fmt;

/// Errors that can occur while loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid config JSON.
    Json(serde_json::Error),
    /// A value is outside its accepted range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors reported by a gesture capture source.
///
/// These never reach the particle field. They are folded into a
/// "not detected" reading with the error flag raised.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureError {
    /// The capture device could not be opened.
    DeviceUnavailable(String),
    /// The landmark detector failed on a frame.
    Detection(String),
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureError::DeviceUnavailable(msg) => write!(f, "Capture device unavailable: {}", msg),
            GestureError::Detection(msg) => write!(f, "Hand detection failed: {}", msg),
        }
    }
}

impl std::error::Error for GestureError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid("particle_count must be > 0".into());
        assert_eq!(err.to_string(), "Invalid config: particle_count must be > 0");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_config_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_gesture_error_display() {
        let err = GestureError::DeviceUnavailable("no camera".into());
        assert_eq!(err.to_string(), "Capture device unavailable: no camera");
    }
}
