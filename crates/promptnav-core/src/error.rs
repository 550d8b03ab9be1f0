#![forbid(unsafe_code)]

//! Error type shared by the engine and its hosts.

/// Errors surfaced by host operations and configuration loading.
///
/// None of these ever escape an event handler: the session folds them into
/// [`crate::panel::RebuildOutcome`] values and log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The document body (mount target) does not exist yet.
    MountTargetUnavailable,
    /// The host refused a DOM operation.
    HostRejected {
        operation: &'static str,
        detail: String,
    },
    /// Configuration failed to parse or validate.
    InvalidConfig(String),
}

impl NavError {
    /// Build a [`NavError::HostRejected`] from any displayable host error.
    pub fn host(operation: &'static str, detail: impl core::fmt::Display) -> Self {
        Self::HostRejected {
            operation,
            detail: detail.to_string(),
        }
    }
}

impl core::fmt::Display for NavError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MountTargetUnavailable => write!(f, "mount target unavailable"),
            Self::HostRejected { operation, detail } => {
                write!(f, "host rejected {operation}: {detail}")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for NavError {}
