//! Error types for TSPlayer
//!
//! Backend and render-sink faults are reported through `PlayerError` and
//! terminate at the view's call site, where they become the generic error
//! state. Configuration problems fail fast when the view is built.

use thiserror::Error;

/// Main error type for TSPlayer
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Decoder backend faults
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Render sink faults
    #[error("Renderer error: {0}")]
    Renderer(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Progress store errors
    #[error("Progress store error: {0}")]
    Progress(String),

    /// File I/O errors
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        PlayerError::Serialization(format!("JSON error: {}", err))
    }
}

impl PlayerError {
    /// Create a decoder error from string
    pub fn decoder<S: Into<String>>(msg: S) -> Self {
        PlayerError::Decoder(msg.into())
    }

    /// Create a configuration error from string
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PlayerError::Config(msg.into())
    }
}

/// Convenience type alias for Results in TSPlayer
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Extension trait for converting other errors to PlayerError
pub trait IntoPlayerError<T> {
    /// Convert this error into a PlayerError with the given context
    fn decoder_err(self, context: &str) -> Result<T>;
    fn renderer_err(self, context: &str) -> Result<T>;
    fn config_err(self, context: &str) -> Result<T>;
    fn progress_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoPlayerError<T> for std::result::Result<T, E> {
    fn decoder_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Decoder(format!("{}: {}", context, e)))
    }

    fn renderer_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Renderer(format!("{}: {}", context, e)))
    }

    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Config(format!("{}: {}", context, e)))
    }

    fn progress_err(self, context: &str) -> Result<T> {
        self.map_err(|e| PlayerError::Progress(format!("{}: {}", context, e)))
    }
}

/// Helper macro for creating internal errors with file and line information
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::utils::error::PlayerError::Internal(
            format!("{} at {}:{}", $msg, file!(), line!())
        )
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::utils::error::PlayerError::Internal(
            format!("{} at {}:{}", format!($fmt, $($arg)*), file!(), line!())
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlayerError::Decoder("prepare failed".to_string());
        assert_eq!(err.to_string(), "Decoder error: prepare failed");

        let err = PlayerError::config("missing decoder factory");
        assert_eq!(err.to_string(), "Configuration error: missing decoder factory");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let player_err: PlayerError = io_err.into();
        assert!(matches!(player_err, PlayerError::Io(_)));
    }

    #[test]
    fn test_into_player_error_trait() {
        let result: std::result::Result<(), &str> = Err("illegal state");
        match result.decoder_err("seek") {
            Err(PlayerError::Decoder(msg)) => assert_eq!(msg, "seek: illegal state"),
            other => panic!("Expected Decoder error, got {:?}", other),
        }
    }

    #[test]
    fn test_internal_error_macro() {
        let err = internal_error!("queue closed for session {}", 3);
        match err {
            PlayerError::Internal(msg) => {
                assert!(msg.starts_with("queue closed for session 3 at "));
                assert!(msg.contains("error.rs"));
            }
            other => panic!("Expected Internal error, got {:?}", other),
        }
    }
}
