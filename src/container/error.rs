//! Error types for container lifecycle management.

use thiserror::Error;

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors that can occur while driving a container through the Docker API.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Docker is not available.
    #[error("Docker not available: {reason}")]
    DockerNotAvailable {
        /// Reason why Docker is unavailable.
        reason: String,
    },

    /// Failed to create the container.
    #[error("Failed to create container '{name}': {reason}")]
    CreationFailed {
        /// Container name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to start the container.
    #[error("Failed to start container '{id}': {reason}")]
    StartFailed {
        /// Container ID.
        id: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to stop the container.
    #[error("Failed to stop container '{id}': {reason}")]
    StopFailed {
        /// Container ID.
        id: String,
        /// Reason for failure.
        reason: String,
    },
}
