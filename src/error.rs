//! Error types for the dialog runtime

use thiserror::Error;

/// Errors surfaced by the dialog engine
#[derive(Debug, Error)]
pub enum DialogError {
    /// The dialog manager was invoked before being fully configured
    #[error("dialog manager is not configured: missing {0}")]
    Unconfigured(&'static str),

    /// A dialog id was not present in the dialog set
    #[error("dialog '{0}' was not found in the dialog set")]
    DialogNotFound(String),

    /// Two different dialog instances were registered under the same id
    #[error("a different dialog with id '{0}' is already registered")]
    DuplicateId(String),

    /// An operation required an active dialog but the stack was empty
    #[error("no active dialog on the stack")]
    NoActiveDialog,

    /// The dialog stack or container nesting grew past its configured bound
    #[error("dialog nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),

    /// Frame or conversation state failed to serialize or deserialize
    #[error("dialog state serialization failed: {0}")]
    State(#[from] serde_json::Error),

    /// The conversation store reported a failure
    #[error("conversation store error: {0}")]
    Storage(#[source] anyhow::Error),

    /// A dialog step raised an application error
    #[error("dialog step failed: {0}")]
    Step(#[source] anyhow::Error),
}

/// Convenience alias used throughout the crate
pub type DialogResult<T> = Result<T, DialogError>;
