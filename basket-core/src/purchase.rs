//! Purchase-state machine.
//!
//! An item is either `Pending` or `Purchased`; both states are reachable
//! from each other and items are created `Pending`. Marking purchased keeps
//! whatever price data was already entered. Unmarking is lossy: the cost
//! data is stale once the purchase is undone, so it is cleared rather than
//! kept around as a ghost value.

use crate::{ShoppingItem, Timestamp};

/// What a purchase toggle did to the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseTransition {
    /// Item was already in the requested state.
    NoChange,
    /// Pending -> Purchased; price data preserved.
    MarkedPurchased,
    /// Purchased -> Pending; price and unit price cleared.
    MarkedPending,
}

/// Move an item into or out of the purchased state.
///
/// Same-state calls are no-ops so a re-delivered UI event cannot wipe price
/// data that a genuine unpurchase would have cleared.
pub fn set_purchased(
    item: &mut ShoppingItem,
    purchased: bool,
    now: Timestamp,
) -> PurchaseTransition {
    if item.is_purchased == purchased {
        return PurchaseTransition::NoChange;
    }
    if purchased {
        item.is_purchased = true;
        item.purchased_at = Some(now);
        PurchaseTransition::MarkedPurchased
    } else {
        item.is_purchased = false;
        item.purchased_at = None;
        item.price = None;
        item.unit_price = None;
        PurchaseTransition::MarkedPending
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityIdType, ListId, ShoppingItem, Unit};
    use chrono::Utc;

    fn priced_item() -> ShoppingItem {
        let mut item =
            ShoppingItem::new(ListId::generate(), "Milk", 1.0, Unit::Liter, Utc::now()).unwrap();
        item.unit_price = Some(4.5);
        item.price = Some(4.5);
        item
    }

    #[test]
    fn test_marking_purchased_preserves_price_data() {
        let mut item = priced_item();
        let now = Utc::now();
        let transition = set_purchased(&mut item, true, now);
        assert_eq!(transition, PurchaseTransition::MarkedPurchased);
        assert!(item.is_purchased);
        assert_eq!(item.purchased_at, Some(now));
        assert_eq!(item.price, Some(4.5));
        assert_eq!(item.unit_price, Some(4.5));
    }

    #[test]
    fn test_unmarking_clears_price_data() {
        let mut item = priced_item();
        set_purchased(&mut item, true, Utc::now());
        let transition = set_purchased(&mut item, false, Utc::now());
        assert_eq!(transition, PurchaseTransition::MarkedPending);
        assert!(!item.is_purchased);
        assert!(item.purchased_at.is_none());
        assert!(item.price.is_none());
        assert!(item.unit_price.is_none());
    }

    #[test]
    fn test_same_state_toggle_is_noop() {
        let mut item = priced_item();
        let transition = set_purchased(&mut item, false, Utc::now());
        assert_eq!(transition, PurchaseTransition::NoChange);
        // Price data survives a redundant "still pending" event.
        assert_eq!(item.price, Some(4.5));

        set_purchased(&mut item, true, Utc::now());
        let purchased_at = item.purchased_at;
        let transition = set_purchased(&mut item, true, Utc::now());
        assert_eq!(transition, PurchaseTransition::NoChange);
        assert_eq!(item.purchased_at, purchased_at);
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
