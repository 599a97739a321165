//! In-memory list store and synchronization layer.
//!
//! The store is the single owner of local list state: every mutation of the
//! `(quantity, unit_price, price)` tuple flows through the reconciliation
//! engine or the purchase-state machine, is applied optimistically, and is
//! then persisted. On success the server response is only acknowledged -
//! applying it verbatim would let a slow response for an old edit overwrite
//! a newer local edit. On failure the whole affected list is re-fetched
//! (a compensating read, not a field-level rollback).

use crate::api_client::PersistenceApi;
use crate::config::ClientConfig;
use crate::error::{ApiClientError, SyncError};
use crate::types::{
    AddItemRequest, CompleteListRequest, CreateListRequest, DuplicateListRequest, PatchItemRequest,
};
use basket_core::{
    complete_list, item_from_suggestion, reconcile, set_purchased, total_price, EditedField,
    EntityIdType, EntityType, FoodSuggestion, GateError, ItemId, ListId, NotFoundError,
    PurchaseTransition, ShoppingItem, ShoppingList, StoreId, Unit, ValidationError,
};
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, warn};

/// One list plus its items, as currently known locally.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub list: ShoppingList,
    pub items: Vec<ShoppingItem>,
}

impl ListEntry {
    /// Derived total of the trip: sum of `price` over purchased items.
    pub fn total_price(&self) -> f64 {
        total_price(&self.items)
    }

    fn item_mut(&mut self, item_id: ItemId) -> Result<&mut ShoppingItem, NotFoundError> {
        self.items
            .iter_mut()
            .find(|item| item.item_id == item_id)
            .ok_or(NotFoundError::Entity {
                entity_type: EntityType::Item,
                id: item_id.as_uuid(),
            })
    }
}

/// In-memory repository keyed by list id.
pub struct ListStore {
    lists: HashMap<ListId, ListEntry>,
    max_receipt_image_bytes: u64,
}

impl ListStore {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            lists: HashMap::new(),
            max_receipt_image_bytes: config.max_receipt_image_bytes,
        }
    }

    pub fn get(&self, list_id: ListId) -> Option<&ListEntry> {
        self.lists.get(&list_id)
    }

    pub fn lists(&self) -> impl Iterator<Item = &ListEntry> {
        self.lists.values()
    }

    fn entry_mut(&mut self, list_id: ListId) -> Result<&mut ListEntry, NotFoundError> {
        self.lists.get_mut(&list_id).ok_or(NotFoundError::Entity {
            entity_type: EntityType::List,
            id: list_id.as_uuid(),
        })
    }

    /// Fetch one list in full and install it, replacing any local state.
    /// This is also the compensating read used after a persistence failure.
    pub async fn load_list<A>(&mut self, api: &A, list_id: ListId) -> Result<(), SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let detail = api.get_list(list_id).await?;
        self.lists.insert(
            detail.list.list_id,
            ListEntry {
                list: detail.list,
                items: detail.items,
            },
        );
        Ok(())
    }

    /// Create a new, empty active list.
    pub async fn create_list<A>(&mut self, api: &A, name: &str) -> Result<ListId, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        require_name(name)?;
        let response = api
            .create_list(&CreateListRequest {
                name: name.to_string(),
            })
            .await?;
        let list_id = response.list.list_id;
        self.lists.insert(
            list_id,
            ListEntry {
                list: response.list,
                items: Vec::new(),
            },
        );
        Ok(list_id)
    }

    /// Add a pending item to a list.
    pub async fn add_item<A>(
        &mut self,
        api: &A,
        list_id: ListId,
        name: &str,
        quantity: f64,
        unit: Unit,
    ) -> Result<ItemId, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let item = ShoppingItem::new(list_id, name, quantity, unit, Utc::now())?;
        self.push_and_persist(api, item).await
    }

    /// Accept a consumption-history suggestion as a new pending item.
    pub async fn accept_suggestion<A>(
        &mut self,
        api: &A,
        list_id: ListId,
        suggestion: &FoodSuggestion,
    ) -> Result<ItemId, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let item = item_from_suggestion(list_id, suggestion, Utc::now())?;
        self.push_and_persist(api, item).await
    }

    async fn push_and_persist<A>(
        &mut self,
        api: &A,
        item: ShoppingItem,
    ) -> Result<ItemId, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let list_id = item.list_id;
        let entry = self.entry_mut(list_id)?;
        let request = AddItemRequest {
            list_id,
            name: item.name.clone(),
            quantity: item.quantity,
            unit: Some(item.unit.clone()),
        };
        let optimistic_id = item.item_id;
        entry.items.push(item);
        debug!(list_id = %list_id, item_id = %optimistic_id, "optimistically added item");

        match api.add_item(&request).await {
            Ok(response) => {
                // The server id is canonical; swap the optimistic row for it.
                let entry = self.entry_mut(list_id)?;
                let item_id = response.item.item_id;
                if let Some(slot) = entry
                    .items
                    .iter_mut()
                    .find(|i| i.item_id == optimistic_id)
                {
                    *slot = response.item;
                }
                Ok(item_id)
            }
            Err(err) => {
                warn!(list_id = %list_id, error = %err, "add item failed, reloading list");
                self.load_list(api, list_id).await?;
                Err(err.into())
            }
        }
    }

    /// Apply a single-field price edit through the reconciliation engine.
    pub async fn edit_item_field<A>(
        &mut self,
        api: &A,
        list_id: ListId,
        item_id: ItemId,
        field: EditedField,
        value: f64,
    ) -> Result<(), SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        validate_field_value(field, value)?;
        let entry = self.entry_mut(list_id)?;
        let item = entry.item_mut(item_id)?;
        let patch = reconcile(item, field, value);
        patch.apply(item);
        debug!(item_id = %item_id, ?field, value, "applied reconciled edit");

        let request = PatchItemRequest::from(patch);
        match api.patch_item(item_id, &request).await {
            Ok(_acknowledged) => {
                // Deliberately not applied: a stale response must not
                // overwrite a newer local edit.
                Ok(())
            }
            Err(err) => {
                warn!(list_id = %list_id, item_id = %item_id, error = %err,
                    "item patch failed, reloading list");
                self.load_list(api, list_id).await?;
                Err(err.into())
            }
        }
    }

    /// Toggle an item's purchased flag through the purchase-state machine.
    pub async fn set_item_purchased<A>(
        &mut self,
        api: &A,
        list_id: ListId,
        item_id: ItemId,
        purchased: bool,
    ) -> Result<(), SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let entry = self.entry_mut(list_id)?;
        let item = entry.item_mut(item_id)?;
        let transition = set_purchased(item, purchased, Utc::now());
        if transition == PurchaseTransition::NoChange {
            return Ok(());
        }
        debug!(item_id = %item_id, purchased, "applied purchase transition");

        let request = PatchItemRequest {
            is_purchased: Some(purchased),
            ..Default::default()
        };
        match api.patch_item(item_id, &request).await {
            Ok(_acknowledged) => Ok(()),
            Err(err) => {
                warn!(list_id = %list_id, item_id = %item_id, error = %err,
                    "purchase toggle failed, reloading list");
                self.load_list(api, list_id).await?;
                Err(err.into())
            }
        }
    }

    /// Delete an item.
    pub async fn delete_item<A>(
        &mut self,
        api: &A,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<(), SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let entry = self.entry_mut(list_id)?;
        entry.item_mut(item_id)?;
        entry.items.retain(|item| item.item_id != item_id);

        match api.delete_item(item_id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(list_id = %list_id, item_id = %item_id, error = %err,
                    "item delete failed, reloading list");
                self.load_list(api, list_id).await?;
                Err(err.into())
            }
        }
    }

    /// Complete a shopping trip, transferring pending items onto a new list
    /// named `transfer_list_name` when any remain.
    ///
    /// The lifecycle engine runs locally first, so invalid completions are
    /// rejected without a network call. On success the server-returned
    /// lists are installed: the server owns the canonical id of the newly
    /// created transfer list.
    pub async fn complete_list<A>(
        &mut self,
        api: &A,
        list_id: ListId,
        store_id: Option<StoreId>,
        transfer_list_name: Option<&str>,
    ) -> Result<Option<ListId>, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        let now = Utc::now();
        let entry = self.entry_mut(list_id)?;
        let outcome = complete_list(
            &mut entry.list,
            &mut entry.items,
            store_id,
            transfer_list_name,
            now,
        )?;

        let request = CompleteListRequest {
            list_id,
            store_id,
            new_list_name: transfer_list_name.map(str::to_string),
        };
        match api.complete_list(&request).await {
            Ok(response) => {
                let local_new = outcome.new_list;
                let entry = self.entry_mut(list_id)?;
                entry.list = response.list;
                match (local_new, response.new_list) {
                    (Some(local_new), Some(server_new)) => {
                        // Move the transferred items under the server's id.
                        let transferred: Vec<ShoppingItem> = entry
                            .items
                            .iter()
                            .filter(|i| i.list_id == local_new.list_id)
                            .cloned()
                            .map(|mut item| {
                                item.list_id = server_new.list_id;
                                item
                            })
                            .collect();
                        entry.items.retain(|i| i.list_id == list_id);
                        let new_id = server_new.list_id;
                        self.lists.insert(
                            new_id,
                            ListEntry {
                                list: server_new,
                                items: transferred,
                            },
                        );
                        Ok(Some(new_id))
                    }
                    (None, None) => Ok(None),
                    (local, server) => {
                        warn!(list_id = %list_id,
                            "completion transfer mismatch (local: {}, server: {}), reloading",
                            local.is_some(), server.is_some());
                        self.load_list(api, list_id).await?;
                        Err(SyncError::Api(ApiClientError::InvalidResponse(
                            "completion transfer mismatch".to_string(),
                        )))
                    }
                }
            }
            Err(err) => {
                warn!(list_id = %list_id, error = %err, "completion failed, reloading list");
                self.load_list(api, list_id).await?;
                Err(err.into())
            }
        }
    }

    /// Duplicate a list as a fresh, unstarted trip.
    ///
    /// The server's duplicate handler is authoritative for the reset
    /// semantics, so no optimistic copy is made; the new list is fetched in
    /// full once created.
    pub async fn duplicate_list<A>(
        &mut self,
        api: &A,
        source_list_id: ListId,
        name: &str,
    ) -> Result<ListId, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        require_name(name)?;
        self.entry_mut(source_list_id)?;

        let response = api
            .duplicate_list(&DuplicateListRequest {
                source_list_id,
                name: name.to_string(),
            })
            .await?;
        let new_id = response.list.list_id;
        self.load_list(api, new_id).await?;
        Ok(new_id)
    }

    /// Import a photographed receipt as a completed list.
    ///
    /// This is the privileged, gate-guarded path: oversized images are
    /// rejected locally as a fatal gate error, and server-side gate
    /// rejections surface as [`SyncError::Gate`] with the retryable/fatal
    /// split intact. Local state is untouched until the import succeeds.
    pub async fn import_receipt<A>(
        &mut self,
        api: &A,
        name: &str,
        store_id: Option<StoreId>,
        image: Vec<u8>,
        file_name: &str,
    ) -> Result<ListId, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        require_name(name)?;
        let size_bytes = image.len() as u64;
        if size_bytes > self.max_receipt_image_bytes {
            return Err(SyncError::Gate(GateError::ImageTooLarge {
                size_bytes,
                max_bytes: self.max_receipt_image_bytes,
            }));
        }

        let response = api.scan_receipt(name, store_id, image, file_name).await?;
        let new_id = response.list.list_id;
        self.load_list(api, new_id).await?;
        debug!(list_id = %new_id, "receipt imported as completed list");
        Ok(new_id)
    }

    /// Fetch the externally computed consumption suggestions.
    pub async fn fetch_suggestions<A>(
        &self,
        api: &A,
    ) -> Result<Vec<FoodSuggestion>, SyncError>
    where
        A: PersistenceApi + ?Sized,
    {
        Ok(api.fetch_suggestions().await?)
    }
}

fn require_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        });
    }
    Ok(())
}

fn validate_field_value(field: EditedField, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("{:?}", field),
            reason: "must be a finite number".to_string(),
        });
    }
    match field {
        EditedField::Quantity if value <= 0.0 => {
            Err(ValidationError::NonPositiveQuantity { quantity: value })
        }
        EditedField::UnitPrice | EditedField::Price if value < 0.0 => {
            Err(ValidationError::InvalidValue {
                field: format!("{:?}", field),
                reason: "must not be negative".to_string(),
            })
        }
        _ => Ok(()),
    }
}

// ============================================================================
// TESTS
// ============================================================================
