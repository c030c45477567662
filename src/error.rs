//! Error types shared across the panel core
//!
//! Nothing in here is fatal: registries and the sync engine log these and
//! keep their last good state. Only user-facing flows (adding a favorite,
//! importing a config) hand them back to the caller.

use thiserror::Error;

/// Failures of the durable key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures reported by the host binding
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("host is not available")]
    Unavailable,

    #[error("host call `{command}` failed: {message}")]
    CallFailed { command: String, message: String },

    #[error("host returned an unexpected descriptor: {0}")]
    Malformed(String),
}

impl HostError {
    pub fn call_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by panel-level operations
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No brush or tool preset is selected in the host, so nothing can be pinned
    #[error("select a brush in the host's brush panel before adding a favorite")]
    NoPresetSelected,

    /// The imported document is not a valid config export
    #[error("import failed: {0}")]
    InvalidImport(String),

    #[error("unknown tool shortcut `{0}`")]
    UnknownTool(String),

    #[error("unknown favorite `{0}`")]
    UnknownFavorite(String),
}

pub type Result<T, E = PanelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_message() {
        let err = HostError::call_failed("select", "modal state busy");
        assert_eq!(
            err.to_string(),
            "host call `select` failed: modal state busy"
        );
    }

    #[test]
    fn test_store_error_converts_into_panel_error() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: PanelError = StoreError::from(json_err).into();
        assert!(matches!(err, PanelError::Store(StoreError::Json(_))));
    }
}
