//! Core entity structures

use crate::{
    EntityIdType, ItemId, ListId, ListStatus, StoreId, Timestamp, Unit, ValidationError,
};
use serde::{Deserialize, Serialize};

/// Shopping list - the aggregate items belong to.
/// Created active by the user; moves to completed through the lifecycle
/// controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub list_id: ListId,
    pub name: String,
    pub status: ListStatus,
    pub store_id: Option<StoreId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ShoppingList {
    /// Create a new active list. Rejects empty names.
    pub fn new(name: impl Into<String>, now: Timestamp) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }
        Ok(Self {
            list_id: ListId::generate(),
            name,
            status: ListStatus::Active,
            store_id: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Shopping item - belongs to exactly one list at any time.
///
/// The `(quantity, unit, unit_price, price)` tuple is mutated only through
/// the reconciliation engine or the purchase-state machine, so there is a
/// single owner of the price invariant at any instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub item_id: ItemId,
    pub list_id: ListId,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Option<String>,
    pub is_purchased: bool,
    pub purchased_at: Option<Timestamp>,
    /// Total cost of the line, in currency units.
    pub price: Option<f64>,
    /// Cost per pricing reference unit (kg, L, or the tracked unit itself).
    pub unit_price: Option<f64>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl ShoppingItem {
    /// Create a new pending item. Rejects empty names and non-positive
    /// quantities before anything reaches the network.
    pub fn new(
        list_id: ListId,
        name: impl Into<String>,
        quantity: f64,
        unit: Unit,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            });
        }
        if !(quantity > 0.0) {
            return Err(ValidationError::NonPositiveQuantity { quantity });
        }
        Ok(Self {
            item_id: ItemId::generate(),
            list_id,
            name,
            quantity,
            unit,
            category: None,
            is_purchased: false,
            purchased_at: None,
            price: None,
            unit_price: None,
            notes: None,
            created_at: now,
        })
    }

    /// Quantity expressed in the pricing reference unit.
    pub fn reference_quantity(&self) -> f64 {
        self.unit.to_reference(self.quantity)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Store - referenced by a completed list, never owned by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub store_id: StoreId,
    pub name: String,
    pub address: Option<String>,
}

/// Statistical consumption summary produced by the external suggester over a
/// 30-day window. Read-only input; never persisted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSuggestion {
    pub food_name: String,
    pub consumption_count: i32,
    pub days_consumed: i32,
    pub avg_quantity: f64,
    pub common_unit: Unit,
    pub last_consumed: Timestamp,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_new_list_is_active() {
        let list = ShoppingList::new("Weekly groceries", Utc::now()).unwrap();
        assert_eq!(list.status, ListStatus::Active);
        assert!(list.completed_at.is_none());
        assert!(list.store_id.is_none());
    }

    #[test]
    fn test_new_list_rejects_empty_name() {
        let result = ShoppingList::new("   ", Utc::now());
        assert!(matches!(
            result,
            Err(ValidationError::RequiredFieldMissing { field }) if field == "name"
        ));
    }

    #[test]
    fn test_new_item_is_pending_without_price_data() {
        let list = ShoppingList::new("Weekly groceries", Utc::now()).unwrap();
        let item = ShoppingItem::new(list.list_id, "Rice", 1.0, Unit::Kilogram, Utc::now()).unwrap();
        assert!(!item.is_purchased);
        assert!(item.purchased_at.is_none());
        assert!(item.price.is_none());
        assert!(item.unit_price.is_none());
    }

    #[test]
    fn test_new_item_rejects_non_positive_quantity() {
        let list_id = ListId::generate();
        for quantity in [0.0, -1.5, f64::NAN] {
            let result = ShoppingItem::new(list_id, "Rice", quantity, Unit::Gram, Utc::now());
            assert!(matches!(
                result,
                Err(ValidationError::NonPositiveQuantity { .. })
            ));
        }
    }

    #[test]
    fn test_reference_quantity_uses_unit_table() {
        let list_id = ListId::generate();
        let item = ShoppingItem::new(list_id, "Flour", 750.0, Unit::Gram, Utc::now()).unwrap();
        assert!((item.reference_quantity() - 0.75).abs() < 1e-9);
    }
}
