//! Error taxonomy for the allocation core.
//!
//! A full seat bucket or a student without preferences is never an error:
//! those are ordinary branches of the matching pass with defined outcomes.

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, AllocError>;

/// Errors surfaced by the allocation core.
#[derive(Debug, Error)]
pub enum AllocError {
    /// Bad input, rejected before any mutation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown entity id at the API boundary
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// Another run for the same cohort is still in flight
    #[error("allocation run already in progress for cohort {cohort_id} (requested round {round})")]
    RunInProgress { cohort_id: u64, round: u32 },

    /// Storage layer failure; the operation may be retried wholesale
    #[error("storage failure: {0}")]
    Storage(String),

    /// SSZ encoding failure while sealing a receipt
    #[error("encoding failure: {0}")]
    Encoding(String),

    /// Invalid engine configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AllocError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        AllocError::Validation(msg.into())
    }

    pub(crate) fn not_found(entity: &'static str, id: u64) -> Self {
        AllocError::NotFound { entity, id }
    }

    /// True for errors caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, AllocError::Validation(_) | AllocError::NotFound { .. })
    }
}
