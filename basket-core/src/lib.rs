//! Basket Core - shopping-list domain types and engines
//!
//! Pure, synchronous domain logic: unit conversion, price/quantity
//! reconciliation, the purchase-state machine, and the list lifecycle
//! controller. No I/O and no async - persistence and transport live in
//! `basket-client`.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod purchase;
pub mod receipt;
pub mod reconcile;
pub mod suggestion;
pub mod units;

pub use entities::{FoodSuggestion, ShoppingItem, ShoppingList, Store};
pub use enums::{EditedField, EntityType, ListStatus};
pub use error::{
    BasketError, BasketResult, GateError, LifecycleError, NotFoundError, ValidationError,
};
pub use identity::{new_entity_id, EntityIdType, ItemId, ListId, StoreId, Timestamp};
pub use lifecycle::{complete_list, duplicate_list, total_price, CompletionOutcome};
pub use purchase::{set_purchased, PurchaseTransition};
pub use receipt::{list_from_receipt, ReceiptExtraction, ReceiptLine};
pub use reconcile::{reconcile, PricePatch};
pub use suggestion::item_from_suggestion;
pub use units::{round2, Unit};
