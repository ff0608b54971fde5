use crate::cleaner::stage::Stage;

/// Errors that end a cleanup run.
///
/// Collaborators report failures as `anyhow::Error`; the cleaner wraps them
/// here so the reader of the progress stream can tell what stopped the run.
/// None of these are retried and nothing already deleted is put back.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// Category token outside the known vocabulary
    #[error("invalid arg: {token}")]
    InvalidArgument { token: String },

    /// The store could not begin a verification pass
    #[error("{stage} scan failed to start: {source}")]
    ScanStart {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// A verification pass broke off before reporting every entry
    #[error("{stage} scan interrupted: {source}")]
    ScanInterrupted {
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// One entry could not be deleted
    #[error("Could not delete {key}: {message}")]
    Deletion { key: String, message: String },

    /// The worker went away without closing the progress stream
    #[error("cleanup worker exited without finishing")]
    WorkerLost,
}

impl CleanError {
    /// Build a deletion failure from the display form of the key and its cause
    pub fn deletion(key: impl Into<String>, cause: &anyhow::Error) -> Self {
        CleanError::Deletion {
            key: key.into(),
            message: cause.to_string(),
        }
    }

    /// Whether the run stopped before any stage was attempted
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CleanError::InvalidArgument { .. })
    }
}
