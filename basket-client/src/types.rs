//! Wire types for the Persistence API.
//!
//! These mirror the external API's JSON bodies. The one deliberate mismatch
//! with the domain is the `unitPrice` wire name for `unit_price` in the item
//! PATCH body; the rename lives here and nowhere else, so the engines only
//! ever speak `unit_price`.

use basket_core::{
    FoodSuggestion, GateError, ItemId, ListId, PricePatch, ShoppingItem, ShoppingList, Store,
    StoreId, Unit,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// LIST TYPES
// ============================================================================

/// Request to create a new, empty active list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
}

/// Response wrapping a single list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    pub list: ShoppingList,
}

/// Full detail of one list: the list row plus its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetailResponse {
    pub list: ShoppingList,
    pub items: Vec<ShoppingItem>,
}

/// Request to complete a shopping trip, optionally transferring pending
/// items onto a new list named `new_list_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteListRequest {
    pub list_id: ListId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_list_name: Option<String>,
}

/// Response to a completion: the completed list and, when pending items were
/// transferred, the new active list that received them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteListResponse {
    pub list: ShoppingList,
    #[serde(default)]
    pub new_list: Option<ShoppingList>,
}

/// Request to duplicate a list as a fresh, unstarted trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateListRequest {
    pub source_list_id: ListId,
    pub name: String,
}

// ============================================================================
// ITEM TYPES
// ============================================================================

/// Request to add a pending item to a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub list_id: ListId,
    pub name: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// Response wrapping a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item: ShoppingItem,
}

/// Partial update of an item. Absent fields are left untouched by the
/// server. Note the `unitPrice` wire name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "unitPrice", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_purchased: Option<bool>,
}

impl From<PricePatch> for PatchItemRequest {
    fn from(patch: PricePatch) -> Self {
        Self {
            quantity: patch.quantity,
            unit: None,
            price: patch.price,
            unit_price: patch.unit_price,
            is_purchased: None,
        }
    }
}

// ============================================================================
// STORE AND SUGGESTION TYPES
// ============================================================================

/// Request to create a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

/// Response wrapping a single store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub store: Store,
}

/// Response from the suggestion endpoint.
pub type SuggestionsResponse = Vec<FoodSuggestion>;

// ============================================================================
// ERROR BODY
// ============================================================================

/// Structured error body returned by the Persistence API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    /// Feature the gate rejected, for gate error codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<u64>,
}

impl ApiErrorBody {
    /// Decode gate rejections into the domain's [`GateError`]. Non-gate
    /// codes return `None` and stay ordinary server errors.
    pub fn as_gate_error(&self) -> Option<GateError> {
        let feature = || {
            self.feature
                .clone()
                .unwrap_or_else(|| "receipt_scan".to_string())
        };
        match self.code.as_str() {
            "QUOTA_EXCEEDED" => Some(GateError::QuotaExceeded { feature: feature() }),
            "AD_UNLOCK_REQUIRED" => Some(GateError::AdUnlockRequired { feature: feature() }),
            "PAYLOAD_MALFORMED" => Some(GateError::PayloadMalformed {
                reason: self.message.clone(),
            }),
            "IMAGE_TOO_LARGE" => Some(GateError::ImageTooLarge {
                size_bytes: self.size_bytes.unwrap_or(0),
                max_bytes: self.max_bytes.unwrap_or(0),
            }),
            _ => None,
        }
    }
}

/// Wire id for the delete/patch query parameter.
pub(crate) fn item_id_query(item_id: ItemId) -> [(&'static str, String); 1] {
    use basket_core::EntityIdType;
    [("id", item_id.as_uuid().to_string())]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use basket_core::{EditedField, EntityIdType, ShoppingItem, Unit};
    use chrono::Utc;

    #[test]
    fn test_patch_request_uses_unit_price_wire_name() {
        let request = PatchItemRequest {
            unit_price: Some(6.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "unitPrice": 6.0 }));
    }

    #[test]
    fn test_patch_request_omits_absent_fields() {
        let request = PatchItemRequest {
            quantity: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"quantity":2.0}"#);
    }

    #[test]
    fn test_price_patch_maps_onto_wire_patch() {
        let item = ShoppingItem::new(
            basket_core::ListId::generate(),
            "Rice",
            500.0,
            Unit::Gram,
            Utc::now(),
        )
        .unwrap();
        let mut item = item;
        item.unit_price = Some(10.0);
        let patch = basket_core::reconcile(&item, EditedField::Quantity, 750.0);
        let request = PatchItemRequest::from(patch);
        assert_eq!(request.quantity, Some(750.0));
        assert_eq!(request.price, Some(7.5));
        assert_eq!(request.unit_price, None);
        assert_eq!(request.is_purchased, None);
    }

    #[test]
    fn test_complete_response_tolerates_missing_new_list() {
        let now = Utc::now();
        let list = basket_core::ShoppingList::new("Trip", now).unwrap();
        let body = serde_json::json!({ "list": list });
        let response: CompleteListResponse = serde_json::from_value(body).unwrap();
        assert!(response.new_list.is_none());
    }

    #[test]
    fn test_gate_error_decoding() {
        let body = ApiErrorBody {
            code: "QUOTA_EXCEEDED".to_string(),
            message: "monthly scans exhausted".to_string(),
            feature: Some("receipt_scan".to_string()),
            size_bytes: None,
            max_bytes: None,
        };
        let gate = body.as_gate_error().unwrap();
        assert!(gate.is_retryable());

        let body = ApiErrorBody {
            code: "PAYLOAD_MALFORMED".to_string(),
            message: "no items found".to_string(),
            feature: None,
            size_bytes: None,
            max_bytes: None,
        };
        let gate = body.as_gate_error().unwrap();
        assert!(!gate.is_retryable());

        let body = ApiErrorBody {
            code: "INTERNAL_ERROR".to_string(),
            message: "boom".to_string(),
            feature: None,
            size_bytes: None,
            max_bytes: None,
        };
        assert!(body.as_gate_error().is_none());
    }
}
