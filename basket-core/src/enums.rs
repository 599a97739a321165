//! Enum types for Basket entities

use serde::{Deserialize, Serialize};

/// Entity type discriminator, used by errors to name what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    List,
    Item,
    Store,
}

/// Status of a shopping list.
///
/// Lists are created `Active` and move to `Completed` through the lifecycle
/// controller. `Archived` is a reachable state in the model but no engine
/// operation currently transitions into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Active,
    Completed,
    Archived,
}

/// The price-tuple field a user edit touched.
///
/// Input to the reconciliation engine; the other two fields are recomputed
/// from this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditedField {
    Quantity,
    UnitPrice,
    Price,
}

// ============================================================================
// TESTS
// ============================================================================
