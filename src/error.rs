//! Error types for store lookups and matching runs.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a store lookup.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached or failed mid-request.
    #[error("{store} store is unavailable: {reason}")]
    Unavailable { store: String, reason: String },

    /// The lookup did not complete within the configured timeout.
    #[error("{store} lookup timed out after {timeout:?}")]
    Timeout { store: String, timeout: Duration },

    /// The store rejected the query shape.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl StoreError {
    /// Transient failures are worth retrying; a bad query never is.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable { .. } | StoreError::Timeout { .. }
        )
    }
}

/// Failure of a whole matching run.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("{what} lookup failed: {source}")]
    Lookup { what: String, source: StoreError },

    #[error("{what} lookup failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        what: String,
        attempts: usize,
        source: StoreError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type MatchResult<T> = Result<T, MatchError>;
