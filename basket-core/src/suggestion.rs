//! Suggestion ingestion adapter.
//!
//! Suggestions are computed externally over a 30-day consumption window;
//! this adapter only turns an accepted suggestion into a pending item. It
//! never computes the statistics.

use crate::{FoodSuggestion, ListId, ShoppingItem, Timestamp, ValidationError};

/// Materialize an accepted suggestion as a pending item on `list_id`.
///
/// The tracked quantity is the average consumed quantity rounded to a whole
/// number, floored at 1 so a rarely-eaten food still produces a buyable line.
pub fn item_from_suggestion(
    list_id: ListId,
    suggestion: &FoodSuggestion,
    now: Timestamp,
) -> Result<ShoppingItem, ValidationError> {
    let quantity = suggestion.avg_quantity.round().max(1.0);
    ShoppingItem::new(
        list_id,
        suggestion.food_name.clone(),
        quantity,
        suggestion.common_unit.clone(),
        now,
    )
}

// ============================================================================
// TESTS
// ============================================================================
