//! Error types for the synchronization layer.

use basket_core::{GateError, LifecycleError, NotFoundError, ValidationError};
use thiserror::Error;

/// Errors from talking to the Persistence API.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Gate rejection: {0}")]
    Gate(#[from] GateError),
    #[error("Server error {code}: {message}")]
    Server { code: String, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
}

/// Errors surfaced by the synchronization layer after local validation,
/// optimistic apply, and compensation have run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Rejected locally, before any network call.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Rejected locally by the lifecycle controller.
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// The external gate refused the privileged action. Retryable variants
    /// may be retried after the gate action completes; fatal ones are
    /// terminal.
    #[error("Gate rejection: {0}")]
    Gate(GateError),

    /// The list or item is not in the local store.
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Persistence failed; local optimism for the affected list has been
    /// discarded by a compensating reload.
    #[error("Persistence error: {0}")]
    Api(ApiClientError),
}

impl From<ApiClientError> for SyncError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Gate(gate) => SyncError::Gate(gate),
            other => SyncError::Api(other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
