//! Identity types for Basket entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 (timestamp-sortable).
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub fn new_entity_id() -> Uuid {
    Uuid::now_v7()
}

/// Common behavior for strongly-typed entity IDs.
/// Keeps a `ListId` from being passed where an `ItemId` is expected while
/// staying a plain UUID on the wire.
pub trait EntityIdType: Copy + Eq + std::hash::Hash {
    fn new(id: Uuid) -> Self;
    fn as_uuid(&self) -> Uuid;

    fn generate() -> Self {
        Self::new(new_entity_id())
    }
}

/// Identifier of a shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(Uuid);

/// Identifier of a shopping item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

/// Identifier of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(Uuid);

impl EntityIdType for ListId {
    fn new(id: Uuid) -> Self {
        Self(id)
    }

    fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl EntityIdType for ItemId {
    fn new(id: Uuid) -> Self {
        Self(id)
    }

    fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl EntityIdType for StoreId {
    fn new(id: Uuid) -> Self {
        Self(id)
    }

    fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
