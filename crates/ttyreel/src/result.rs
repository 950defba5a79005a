//! Result and error types for Ttyreel.

use thiserror::Error;

/// Result type for Ttyreel operations
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors that can occur in Ttyreel
#[derive(Debug, Error)]
pub enum ReelError {
    /// Recording or config file does not exist
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was looked up
        path: String,
    },

    /// Configuration document is malformed or inconsistent
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// Recording file content is malformed
    #[error("Invalid recording file: {message}")]
    InvalidRecording {
        /// Error message
        message: String,
    },

    /// The recorded process produced no output at all
    #[error("Nothing was recorded: the process exited without output")]
    EmptyRecording,

    /// Pseudo-terminal could not be opened or the process failed to spawn
    #[error("Failed to spawn process: {message}")]
    Spawn {
        /// Error message
        message: String,
    },

    /// Terminal capture failed
    #[error("Capture failed: {message}")]
    Capture {
        /// Error message
        message: String,
    },

    /// Image processing error (rasterizing, resizing, encoding)
    #[error("Image processing failed: {message}")]
    ImageProcessing {
        /// Error message
        message: String,
    },

    /// Invalid state error (operation called in wrong state)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG decode/encode error
    #[cfg(feature = "media")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ReelError {
    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid recording error
    #[must_use]
    pub fn invalid_recording(message: impl Into<String>) -> Self {
        Self::InvalidRecording {
            message: message.into(),
        }
    }

    /// Create a spawn error
    #[must_use]
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn {
            message: message.into(),
        }
    }

    /// Create a capture error
    #[must_use]
    pub fn capture(message: impl Into<String>) -> Self {
        Self::Capture {
            message: message.into(),
        }
    }

    /// Create an image processing error
    #[must_use]
    pub fn image(message: impl Into<String>) -> Self {
        Self::ImageProcessing {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }
}
