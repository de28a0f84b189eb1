//! Error types for focus requests and configuration loading.
//!
//! Nothing in the camera core is fatal. A `FocusFault` means "not yet",
//! and the engine parks the request and retries it on the next frame.

use std::path::PathBuf;

use thiserror::Error;

use crate::anchor::BodyId;

/// Recoverable fault raised while trying to start a focus transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FocusFault {
    /// The body resolver has no anchor for this id yet (scene still loading).
    #[error("Anchor for body '{0}' is not available yet")]
    AnchorUnavailable(BodyId),

    /// The primary rig has not been mounted (or was unmounted).
    #[error("Primary camera rig is not mounted")]
    RigNotMounted,
}

impl FocusFault {
    /// Check if the request should be retried on a later frame.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FocusFault::AnchorUnavailable(_) | FocusFault::RigNotMounted
        )
    }
}

/// Result type for focus operations
pub type FocusResult<T> = Result<T, FocusFault>;

/// Errors raised while loading or validating `CameraConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid camera config: {0}")]
    Invalid(String),
}
