//! # Playback Error Types
//!
//! The synchronizer itself never fails: stalls degrade to *waiting* and
//! exhaustion to *ended*. Errors only exist where a session is assembled
//! and where a host talks to a driver that has already shut down.

use thiserror::Error;

/// Errors that can occur while assembling or addressing a playback session.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// A required host capability was not provided to the builder.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// Playback configuration failed validation.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    /// The driver task has stopped and no longer accepts commands.
    #[error("Playback driver closed")]
    DriverClosed,

    /// Runtime infrastructure error (logging setup and the like).
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// Returns `true` if the error comes from how the session was put together.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::CapabilityMissing { .. } | PlaybackError::InvalidConfig(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
