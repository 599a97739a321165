//! Basket Test Utilities
//!
//! Centralized test infrastructure for the Basket workspace:
//! - In-memory mock of the Persistence API with failure injection
//! - Proptest generators for the domain types
//! - Test fixtures for common scenarios

// Re-export core types for convenience
pub use basket_core::{
    complete_list, duplicate_list, item_from_suggestion, list_from_receipt, reconcile, round2,
    set_purchased, total_price, BasketError, BasketResult, CompletionOutcome, EditedField,
    EntityType, FoodSuggestion, GateError, LifecycleError, ListStatus, NotFoundError, PricePatch,
    PurchaseTransition, ReceiptExtraction, ReceiptLine, ShoppingItem, ShoppingList, Store,
    Timestamp, Unit, ValidationError,
    // Strongly-typed entity IDs
    EntityIdType, ItemId, ListId, StoreId,
};

use async_trait::async_trait;
use basket_client::{
    AddItemRequest, ApiClientError, CompleteListRequest, CompleteListResponse, CreateListRequest,
    CreateStoreRequest, DuplicateListRequest, ItemResponse, ListDetailResponse, ListResponse,
    PatchItemRequest, PersistenceApi, StoreResponse, SuggestionsResponse,
};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

// ============================================================================
// MOCK PERSISTENCE API
// ============================================================================

/// In-memory mock of the Persistence API for testing.
///
/// Runs the real domain engines server-side, so the mock behaves like the
/// backend the synchronization layer expects: patch bodies are applied
/// field-wise, completion and duplication go through the lifecycle
/// controller, and receipt scans materialize the configured extraction.
///
/// Failure injection: queued errors are returned by the next API calls in
/// order, letting tests drive the compensating-reload path. Every call is
/// recorded by method name for interaction assertions.
#[derive(Debug, Default)]
pub struct MockPersistence {
    lists: Arc<RwLock<HashMap<ListId, ShoppingList>>>,
    items: Arc<RwLock<HashMap<ItemId, ShoppingItem>>>,
    stores: Arc<RwLock<HashMap<StoreId, Store>>>,
    suggestions: Arc<RwLock<Vec<FoodSuggestion>>>,
    extraction: Arc<RwLock<Option<ReceiptExtraction>>>,
    scan_gate: Arc<RwLock<Option<GateError>>>,
    fail_queue: Arc<RwLock<VecDeque<ApiClientError>>>,
    stale_patch_responses: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    // === Seeding ===

    pub fn seed_list(&self, list: &ShoppingList) {
        self.lists
            .write()
            .unwrap()
            .insert(list.list_id, list.clone());
    }

    pub fn seed_item(&self, item: &ShoppingItem) {
        self.items
            .write()
            .unwrap()
            .insert(item.item_id, item.clone());
    }

    pub fn seed_list_with_items(&self, list: &ShoppingList, items: &[ShoppingItem]) {
        self.seed_list(list);
        for item in items {
            self.seed_item(item);
        }
    }

    pub fn set_suggestions(&self, suggestions: Vec<FoodSuggestion>) {
        *self.suggestions.write().unwrap() = suggestions;
    }

    /// Configure the extraction the next receipt scans will materialize.
    pub fn set_extraction(&self, extraction: ReceiptExtraction) {
        *self.extraction.write().unwrap() = Some(extraction);
    }

    /// Make receipt scans fail with the given gate rejection until cleared.
    pub fn set_scan_gate(&self, gate: Option<GateError>) {
        *self.scan_gate.write().unwrap() = gate;
    }

    // === Failure injection ===

    /// Queue an error for the next API call.
    pub fn fail_next_with(&self, err: ApiClientError) {
        self.fail_queue.write().unwrap().push_back(err);
    }

    /// Queue a generic server error for the next API call.
    pub fn fail_next(&self) {
        self.fail_next_with(ApiClientError::Server {
            code: "INTERNAL_ERROR".to_string(),
            message: "injected failure".to_string(),
        });
    }

    /// When set, patch responses return the item as it was before the patch.
    /// Lets tests prove that the sync layer acknowledges without applying.
    pub fn set_stale_patch_responses(&self, stale: bool) {
        *self.stale_patch_responses.write().unwrap() = stale;
    }

    // === Inspection ===

    /// All recorded call names, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == method)
            .count()
    }

    pub fn list_count(&self) -> usize {
        self.lists.read().unwrap().len()
    }

    pub fn item_count(&self) -> usize {
        self.items.read().unwrap().len()
    }

    /// Current server-side copy of an item.
    pub fn stored_item(&self, item_id: ItemId) -> Option<ShoppingItem> {
        self.items.read().unwrap().get(&item_id).cloned()
    }

    /// Current server-side copy of a list.
    pub fn stored_list(&self, list_id: ListId) -> Option<ShoppingList> {
        self.lists.read().unwrap().get(&list_id).cloned()
    }

    fn record(&self, method: &str) -> Result<(), ApiClientError> {
        self.calls.write().unwrap().push(method.to_string());
        if let Some(err) = self.fail_queue.write().unwrap().pop_front() {
            return Err(err);
        }
        Ok(())
    }

    fn items_of(&self, list_id: ListId) -> Vec<ShoppingItem> {
        let mut items: Vec<ShoppingItem> = self
            .items
            .read()
            .unwrap()
            .values()
            .filter(|item| item.list_id == list_id)
            .cloned()
            .collect();
        // HashMap order is arbitrary; UUIDv7 ids sort by creation time.
        items.sort_by_key(|item| item.item_id.as_uuid());
        items
    }
}

fn not_found(entity_type: EntityType, id: uuid::Uuid) -> ApiClientError {
    ApiClientError::Server {
        code: "NOT_FOUND".to_string(),
        message: format!("{:?} {} not found", entity_type, id),
    }
}

fn validation(err: ValidationError) -> ApiClientError {
    ApiClientError::Server {
        code: "VALIDATION".to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl PersistenceApi for MockPersistence {
    async fn list_lists(&self) -> Result<Vec<ShoppingList>, ApiClientError> {
        self.record("list_lists")?;
        let mut lists: Vec<ShoppingList> = self.lists.read().unwrap().values().cloned().collect();
        lists.sort_by_key(|list| list.list_id.as_uuid());
        Ok(lists)
    }

    async fn get_list(&self, list_id: ListId) -> Result<ListDetailResponse, ApiClientError> {
        self.record("get_list")?;
        let list = self
            .lists
            .read()
            .unwrap()
            .get(&list_id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::List, list_id.as_uuid()))?;
        Ok(ListDetailResponse {
            list,
            items: self.items_of(list_id),
        })
    }

    async fn create_list(&self, req: &CreateListRequest) -> Result<ListResponse, ApiClientError> {
        self.record("create_list")?;
        let list = ShoppingList::new(&req.name, Utc::now()).map_err(validation)?;
        self.lists.write().unwrap().insert(list.list_id, list.clone());
        Ok(ListResponse { list })
    }

    async fn add_item(&self, req: &AddItemRequest) -> Result<ItemResponse, ApiClientError> {
        self.record("add_item")?;
        if !self.lists.read().unwrap().contains_key(&req.list_id) {
            return Err(not_found(EntityType::List, req.list_id.as_uuid()));
        }
        let unit = req.unit.clone().unwrap_or(Unit::Each);
        let item = ShoppingItem::new(req.list_id, &req.name, req.quantity, unit, Utc::now())
            .map_err(validation)?;
        self.items.write().unwrap().insert(item.item_id, item.clone());
        Ok(ItemResponse { item })
    }

    async fn patch_item(
        &self,
        item_id: ItemId,
        req: &PatchItemRequest,
    ) -> Result<ItemResponse, ApiClientError> {
        self.record("patch_item")?;
        let mut items = self.items.write().unwrap();
        let item = items
            .get_mut(&item_id)
            .ok_or_else(|| not_found(EntityType::Item, item_id.as_uuid()))?;
        let before = item.clone();

        if let Some(quantity) = req.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = &req.unit {
            item.unit = unit.clone();
        }
        if let Some(price) = req.price {
            item.price = Some(price);
        }
        if let Some(unit_price) = req.unit_price {
            item.unit_price = Some(unit_price);
        }
        if let Some(purchased) = req.is_purchased {
            set_purchased(item, purchased, Utc::now());
        }

        let returned = if *self.stale_patch_responses.read().unwrap() {
            before
        } else {
            item.clone()
        };
        Ok(ItemResponse { item: returned })
    }

    async fn delete_item(&self, item_id: ItemId) -> Result<(), ApiClientError> {
        self.record("delete_item")?;
        self.items
            .write()
            .unwrap()
            .remove(&item_id)
            .map(|_| ())
            .ok_or_else(|| not_found(EntityType::Item, item_id.as_uuid()))
    }

    async fn complete_list(
        &self,
        req: &CompleteListRequest,
    ) -> Result<CompleteListResponse, ApiClientError> {
        self.record("complete_list")?;
        let mut list = self
            .lists
            .read()
            .unwrap()
            .get(&req.list_id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::List, req.list_id.as_uuid()))?;
        let mut items = self.items_of(req.list_id);

        let outcome = complete_list(
            &mut list,
            &mut items,
            req.store_id,
            req.new_list_name.as_deref(),
            Utc::now(),
        )
        .map_err(|err| ApiClientError::Server {
            code: "LIFECYCLE".to_string(),
            message: err.to_string(),
        })?;

        let mut lists = self.lists.write().unwrap();
        lists.insert(list.list_id, list.clone());
        if let Some(new_list) = &outcome.new_list {
            lists.insert(new_list.list_id, new_list.clone());
        }
        let mut stored = self.items.write().unwrap();
        for item in items {
            stored.insert(item.item_id, item);
        }

        Ok(CompleteListResponse {
            list,
            new_list: outcome.new_list,
        })
    }

    async fn duplicate_list(
        &self,
        req: &DuplicateListRequest,
    ) -> Result<ListResponse, ApiClientError> {
        self.record("duplicate_list")?;
        let source = self
            .lists
            .read()
            .unwrap()
            .get(&req.source_list_id)
            .cloned()
            .ok_or_else(|| not_found(EntityType::List, req.source_list_id.as_uuid()))?;
        let items = self.items_of(req.source_list_id);

        let (new_list, cloned) =
            duplicate_list(&source, &items, &req.name, Utc::now()).map_err(validation)?;
        self.lists
            .write()
            .unwrap()
            .insert(new_list.list_id, new_list.clone());
        let mut stored = self.items.write().unwrap();
        for item in cloned {
            stored.insert(item.item_id, item);
        }
        Ok(ListResponse { list: new_list })
    }

    async fn fetch_suggestions(&self) -> Result<SuggestionsResponse, ApiClientError> {
        self.record("fetch_suggestions")?;
        Ok(self.suggestions.read().unwrap().clone())
    }

    async fn scan_receipt(
        &self,
        name: &str,
        store_id: Option<StoreId>,
        _image: Vec<u8>,
        _file_name: &str,
    ) -> Result<ListResponse, ApiClientError> {
        self.record("scan_receipt")?;
        if let Some(gate) = self.scan_gate.read().unwrap().clone() {
            return Err(ApiClientError::Gate(gate));
        }
        let extraction = self
            .extraction
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| {
                ApiClientError::Gate(GateError::PayloadMalformed {
                    reason: "no items recognized".to_string(),
                })
            })?;

        let (list, items) =
            list_from_receipt(name, store_id, &extraction, Utc::now()).map_err(validation)?;
        self.lists.write().unwrap().insert(list.list_id, list.clone());
        let mut stored = self.items.write().unwrap();
        for item in items {
            stored.insert(item.item_id, item);
        }
        Ok(ListResponse { list })
    }

    async fn create_store(
        &self,
        req: &CreateStoreRequest,
    ) -> Result<StoreResponse, ApiClientError> {
        self.record("create_store")?;
        if req.name.trim().is_empty() {
            return Err(validation(ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            }));
        }
        let store = Store {
            store_id: StoreId::generate(),
            name: req.name.clone(),
            address: None,
        };
        self.stores
            .write()
            .unwrap()
            .insert(store.store_id, store.clone());
        Ok(StoreResponse { store })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    // === Identity Type Generators ===

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a random ListId.
    pub fn arb_list_id() -> impl Strategy<Value = ListId> {
        arb_uuid().prop_map(ListId::new)
    }

    /// Generate a random ItemId.
    pub fn arb_item_id() -> impl Strategy<Value = ItemId> {
        arb_uuid().prop_map(ItemId::new)
    }

    /// Generate a random StoreId.
    pub fn arb_store_id() -> impl Strategy<Value = StoreId> {
        arb_uuid().prop_map(StoreId::new)
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // Timestamps within 2020-2030
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    // === Enum Generators ===

    pub fn arb_unit() -> impl Strategy<Value = Unit> {
        prop_oneof![
            Just(Unit::Gram),
            Just(Unit::Milliliter),
            Just(Unit::Kilogram),
            Just(Unit::Liter),
            Just(Unit::Each),
            Just(Unit::Package),
            Just(Unit::Box),
        ]
    }

    pub fn arb_edited_field() -> impl Strategy<Value = EditedField> {
        prop_oneof![
            Just(EditedField::Quantity),
            Just(EditedField::UnitPrice),
            Just(EditedField::Price),
        ]
    }

    // === Value Generators ===

    /// Positive quantity in a realistic grocery range.
    pub fn arb_quantity() -> impl Strategy<Value = f64> {
        0.01f64..10_000.0
    }

    /// Non-negative price in a realistic range.
    pub fn arb_price() -> impl Strategy<Value = f64> {
        0.0f64..1_000.0
    }

    pub fn arb_item_name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,30}"
    }

    // === Entity Generators ===

    pub fn arb_shopping_list() -> impl Strategy<Value = ShoppingList> {
        (arb_item_name(), arb_timestamp()).prop_map(|(name, now)| {
            ShoppingList::new(name, now).expect("generated name is non-empty")
        })
    }

    /// Generate a pending item on the given list.
    pub fn arb_pending_item(list_id: ListId) -> impl Strategy<Value = ShoppingItem> {
        (arb_item_name(), arb_quantity(), arb_unit(), arb_timestamp()).prop_map(
            move |(name, quantity, unit, now)| {
                ShoppingItem::new(list_id, name, quantity, unit, now)
                    .expect("generated fields are valid")
            },
        )
    }

    /// Generate a purchased item with consistent price data.
    pub fn arb_purchased_item(list_id: ListId) -> impl Strategy<Value = ShoppingItem> {
        (arb_pending_item(list_id), 0.01f64..100.0).prop_map(|(mut item, unit_price)| {
            let now = item.created_at;
            set_purchased(&mut item, true, now);
            item.unit_price = Some(round2(unit_price));
            item.price = Some(round2(item.reference_quantity() * round2(unit_price)));
            item
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Fixed timestamp so fixture-based assertions are reproducible.
    pub fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap()
    }

    pub fn active_list() -> ShoppingList {
        ShoppingList::new("Weekly groceries", fixed_now()).expect("fixture name is valid")
    }

    pub fn completed_list() -> ShoppingList {
        let mut list = active_list();
        list.status = ListStatus::Completed;
        list.completed_at = Some(fixed_now());
        list
    }

    pub fn pending_item(list_id: ListId) -> ShoppingItem {
        ShoppingItem::new(list_id, "Rice", 500.0, Unit::Gram, fixed_now())
            .expect("fixture fields are valid")
    }

    pub fn purchased_item(list_id: ListId) -> ShoppingItem {
        let mut item = ShoppingItem::new(list_id, "Milk", 1.0, Unit::Liter, fixed_now())
            .expect("fixture fields are valid");
        set_purchased(&mut item, true, fixed_now());
        item.unit_price = Some(4.99);
        item.price = Some(4.99);
        item
    }

    pub fn rice_suggestion() -> FoodSuggestion {
        FoodSuggestion {
            food_name: "Rice".to_string(),
            consumption_count: 12,
            days_consumed: 9,
            avg_quantity: 1.4,
            common_unit: Unit::Each,
            last_consumed: fixed_now(),
        }
    }

    pub fn market_receipt() -> ReceiptExtraction {
        ReceiptExtraction {
            date: Some(fixed_now()),
            items: vec![
                ReceiptLine {
                    name: "Rice".to_string(),
                    quantity: 2.0,
                    unit: Unit::Kilogram,
                    unit_price: 6.5,
                    total_price: 13.0,
                },
                ReceiptLine {
                    name: "Milk".to_string(),
                    quantity: 1.0,
                    unit: Unit::Liter,
                    unit_price: 4.99,
                    total_price: 4.99,
                },
            ],
            total: 17.99,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_round_trips_a_list() {
        let mock = MockPersistence::new();
        let list = fixtures::active_list();
        let item = fixtures::pending_item(list.list_id);
        mock.seed_list_with_items(&list, &[item.clone()]);

        let detail = mock.get_list(list.list_id).await.unwrap();
        assert_eq!(detail.list, list);
        assert_eq!(detail.items, vec![item]);
        assert_eq!(mock.calls(), vec!["get_list"]);
    }

    #[tokio::test]
    async fn test_injected_failure_hits_next_call_only() {
        let mock = MockPersistence::new();
        let list = fixtures::active_list();
        mock.seed_list(&list);
        mock.fail_next();

        assert!(mock.get_list(list.list_id).await.is_err());
        assert!(mock.get_list(list.list_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_scan_gate_rejects_with_gate_error() {
        let mock = MockPersistence::new();
        mock.set_scan_gate(Some(GateError::QuotaExceeded {
            feature: "receipt_scan".to_string(),
        }));
        let result = mock.scan_receipt("Market run", None, vec![0u8; 4], "r.jpg").await;
        assert!(matches!(result, Err(ApiClientError::Gate(_))));
    }
}
