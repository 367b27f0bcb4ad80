//! Error types and handling for the `Floodcast` core

use thiserror::Error;

/// Main error type for the `Floodcast` core
#[derive(Error, Debug)]
pub enum FloodcastError {
    /// The user declined foreground location access
    #[error("Location permission denied")]
    PermissionDenied,

    /// The platform could not produce a position fix
    #[error("Position unavailable: {message}")]
    PositionUnavailable { message: String },

    /// A map pick was committed while neither region nor marker was set
    #[error("No map selection to commit")]
    NoSelection,

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FloodcastError {
    /// Create a new position-unavailable error
    pub fn position_unavailable<S: Into<String>>(message: S) -> Self {
        Self::PositionUnavailable {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FloodcastError::PermissionDenied => {
                "Permission to access location was denied.".to_string()
            }
            FloodcastError::PositionUnavailable { .. } => "Failed to get location".to_string(),
            FloodcastError::NoSelection => {
                "Pick a point on the map before continuing.".to_string()
            }
            FloodcastError::Validation { message } => format!("Invalid input: {message}"),
            FloodcastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            FloodcastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
