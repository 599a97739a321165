//! List lifecycle controller: completion (with optional pending-item
//! transfer) and duplication.
//!
//! Completion is a single atomic transition. The interaction sequence in the
//! UI (pick a store, then name the overflow list) is collapsed into one call
//! with an optional transfer name.

use crate::{
    EntityIdType, ItemId, LifecycleError, ListStatus, ShoppingItem, ShoppingList, StoreId,
    Timestamp, ValidationError,
};

/// Result of completing a list.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// Newly created active list that received the pending items.
    /// `None` when every item was already purchased.
    pub new_list: Option<ShoppingList>,
    /// Number of items re-parented onto the new list.
    pub transferred: usize,
}

/// Complete a shopping trip.
///
/// Partitions the list's items into purchased and pending. Purchased items
/// stay on the now-completed list; pending items are re-parented in place
/// onto a freshly created active list named `transfer_list_name`. No item is
/// ever cloned or dropped: the two lists partition the original item set.
///
/// Pending items with no transfer name is an error - completing would
/// otherwise strand unbought items on a completed list.
pub fn complete_list(
    list: &mut ShoppingList,
    items: &mut [ShoppingItem],
    store_id: Option<StoreId>,
    transfer_list_name: Option<&str>,
    now: Timestamp,
) -> Result<CompletionOutcome, LifecycleError> {
    if list.status == ListStatus::Completed {
        return Err(LifecycleError::AlreadyCompleted {
            list_id: list.list_id.as_uuid(),
        });
    }
    for item in items.iter() {
        if item.list_id != list.list_id {
            return Err(LifecycleError::ForeignItem {
                item_id: item.item_id.as_uuid(),
                list_id: list.list_id.as_uuid(),
            });
        }
    }

    let pending: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.is_purchased)
        .map(|(idx, _)| idx)
        .collect();

    let new_list = if pending.is_empty() {
        None
    } else {
        let name = transfer_list_name.map(str::trim).filter(|n| !n.is_empty());
        let name = name.ok_or(LifecycleError::TransferListRequired {
            list_id: list.list_id.as_uuid(),
            pending: pending.len(),
        })?;
        // Name is non-empty by the filter above, so construction cannot fail.
        let new_list = ShoppingList::new(name, now).expect("transfer list name validated");
        for idx in &pending {
            items[*idx].list_id = new_list.list_id;
        }
        Some(new_list)
    };

    list.status = ListStatus::Completed;
    list.completed_at = Some(now);
    list.store_id = store_id;
    list.updated_at = now;

    Ok(CompletionOutcome {
        transferred: pending.len(),
        new_list,
    })
}

/// Duplicate a list as a fresh, unstarted trip.
///
/// Every item is cloned preserving name, quantity, unit, category and notes,
/// with the purchase flag reset and price data cleared. The source list is
/// untouched.
pub fn duplicate_list(
    source: &ShoppingList,
    items: &[ShoppingItem],
    new_name: &str,
    now: Timestamp,
) -> Result<(ShoppingList, Vec<ShoppingItem>), ValidationError> {
    let new_list = ShoppingList::new(new_name, now)?;
    let cloned = items
        .iter()
        .filter(|item| item.list_id == source.list_id)
        .map(|item| ShoppingItem {
            item_id: ItemId::generate(),
            list_id: new_list.list_id,
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            category: item.category.clone(),
            is_purchased: false,
            purchased_at: None,
            price: None,
            unit_price: None,
            notes: item.notes.clone(),
            created_at: now,
        })
        .collect();
    Ok((new_list, cloned))
}

/// Derived total cost of a completed trip: the sum of `price` over purchased
/// items. Never stored; computed at read time.
pub fn total_price(items: &[ShoppingItem]) -> f64 {
    crate::round2(
        items
            .iter()
            .filter(|item| item.is_purchased)
            .filter_map(|item| item.price)
            .sum(),
    )
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
