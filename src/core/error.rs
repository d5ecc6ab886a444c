use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuoteError>;

/// Failures surfaced by the quote store and the sync agent.
///
/// None of these are fatal: validation errors abort the operation without
/// touching the store, sync failures are retried on the next tick.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Please enter both a quote and a category.")]
    EmptyField,

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Sync failed: {0}")]
    SyncFailed(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QuoteError {
    /// Transient errors clear up on their own once the remote is reachable again.
    pub fn is_transient(&self) -> bool {
        matches!(self, QuoteError::SyncFailed(_))
    }
}
