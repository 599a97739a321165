//! Error types for Basket operations

use crate::EntityType;
use thiserror::Error;
use uuid::Uuid;

/// Local input validation errors.
///
/// These are raised before any network call and surfaced as form errors,
/// never as persistence failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Quantity must be positive, got {quantity}")]
    NonPositiveQuantity { quantity: f64 },
}

/// List lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LifecycleError {
    #[error("List {list_id} is already completed")]
    AlreadyCompleted { list_id: Uuid },

    #[error("List {list_id} has {pending} pending items but no transfer list name was given")]
    TransferListRequired { list_id: Uuid, pending: usize },

    #[error("Item {item_id} does not belong to list {list_id}")]
    ForeignItem { item_id: Uuid, list_id: Uuid },
}

/// Rejections from the external privileged-action policy (quota / ad-unlock)
/// guarding the receipt import path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Monthly quota exceeded for {feature}")]
    QuotaExceeded { feature: String },

    #[error("Ad unlock required for {feature}")]
    AdUnlockRequired { feature: String },

    #[error("Malformed payload: {reason}")]
    PayloadMalformed { reason: String },

    #[error("Image too large: {size_bytes} bytes (max {max_bytes})")]
    ImageTooLarge { size_bytes: u64, max_bytes: u64 },
}

impl GateError {
    /// Whether the user may retry after completing the external gate action
    /// (watching an ad, waiting for quota reset). Fatal variants should be
    /// surfaced as terminal errors instead.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GateError::QuotaExceeded { .. } | GateError::AdUnlockRequired { .. }
        )
    }
}

/// Lookup errors against the in-memory repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    Entity { entity_type: EntityType, id: Uuid },
}

/// Master error type for all Basket operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BasketError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),
}

/// Result type alias for Basket operations.
pub type BasketResult<T> = Result<T, BasketError>;

// ============================================================================
// TESTS
// ============================================================================
