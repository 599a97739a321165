//! Receipt ingestion adapter.
//!
//! A receipt documents a purchase that already happened, so its extraction
//! materializes a list directly in the completed state: every item arrives
//! purchased with both price fields set, and no reconciliation runs. The
//! OCR/AI extraction itself and the quota/ad gate in front of it are
//! external collaborators.

use crate::{
    round2, ListStatus, ShoppingItem, ShoppingList, StoreId, Timestamp, Unit, ValidationError,
};
use serde::{Deserialize, Serialize};

/// One line of a scanned receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Structured extraction produced by the external OCR service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptExtraction {
    /// Purchase date printed on the receipt, when the OCR could read it.
    pub date: Option<Timestamp>,
    pub items: Vec<ReceiptLine>,
    /// Receipt grand total as printed.
    pub total: f64,
}

/// Materialize a receipt extraction as a completed list with purchased,
/// price-consistent items.
///
/// The completion timestamp is the receipt's printed date when available,
/// otherwise the import time. Rejects extractions with no lines, blank line
/// names, or non-positive quantities before anything is persisted.
pub fn list_from_receipt(
    name: &str,
    store_id: Option<StoreId>,
    extraction: &ReceiptExtraction,
    now: Timestamp,
) -> Result<(ShoppingList, Vec<ShoppingItem>), ValidationError> {
    if extraction.items.is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "items".to_string(),
        });
    }

    let mut list = ShoppingList::new(name, now)?;
    let completed_at = extraction.date.unwrap_or(now);
    list.status = ListStatus::Completed;
    list.completed_at = Some(completed_at);
    list.store_id = store_id;

    let mut items = Vec::with_capacity(extraction.items.len());
    for line in &extraction.items {
        let mut item = ShoppingItem::new(
            list.list_id,
            line.name.clone(),
            line.quantity,
            line.unit.clone(),
            now,
        )?;
        item.is_purchased = true;
        item.purchased_at = Some(completed_at);
        item.unit_price = Some(round2(line.unit_price));
        item.price = Some(round2(line.total_price));
        items.push(item);
    }

    Ok((list, items))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lifecycle::total_price, Unit};
    use chrono::{TimeZone, Utc};

    fn extraction() -> ReceiptExtraction {
        ReceiptExtraction {
            date: Some(Utc.with_ymd_and_hms(2026, 8, 20, 18, 30, 0).unwrap()),
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

    #[test]
    fn test_receipt_materializes_completed_list() {
        let extraction = extraction();
        let (list, items) =
            list_from_receipt("Market run", None, &extraction, Utc::now()).unwrap();

        assert_eq!(list.status, ListStatus::Completed);
        assert_eq!(list.completed_at, extraction.date);
        assert_eq!(items.len(), 2);
        for item in &items {
            assert_eq!(item.list_id, list.list_id);
            assert!(item.is_purchased);
            assert_eq!(item.purchased_at, extraction.date);
            assert!(item.price.is_some());
            assert!(item.unit_price.is_some());
        }
        assert_eq!(total_price(&items), 17.99);
    }

    #[test]
    fn test_receipt_without_date_uses_import_time() {
        let mut extraction = extraction();
        extraction.date = None;
        let now = Utc::now();
        let (list, items) = list_from_receipt("Market run", None, &extraction, now).unwrap();
        assert_eq!(list.completed_at, Some(now));
        assert!(items.iter().all(|i| i.purchased_at == Some(now)));
    }

    #[test]
    fn test_receipt_records_store() {
        use crate::{EntityIdType, StoreId};
        let store_id = StoreId::generate();
        let (list, _) =
            list_from_receipt("Market run", Some(store_id), &extraction(), Utc::now()).unwrap();
        assert_eq!(list.store_id, Some(store_id));
    }

    #[test]
    fn test_empty_extraction_is_rejected() {
        let empty = ReceiptExtraction {
            date: None,
            items: vec![],
            total: 0.0,
        };
        let result = list_from_receipt("Market run", None, &empty, Utc::now());
        assert!(matches!(
            result,
            Err(ValidationError::RequiredFieldMissing { field }) if field == "items"
        ));
    }

    #[test]
    fn test_non_positive_line_quantity_is_rejected() {
        let mut extraction = extraction();
        extraction.items[1].quantity = 0.0;
        let result = list_from_receipt("Market run", None, &extraction, Utc::now());
        assert!(matches!(
            result,
            Err(ValidationError::NonPositiveQuantity { .. })
        ));
    }

    #[test]
    fn test_line_prices_round_to_cents() {
        let mut extraction = extraction();
        extraction.items[0].unit_price = 6.499;
        extraction.items[0].total_price = 12.998;
        let (_, items) = list_from_receipt("Market run", None, &extraction, Utc::now()).unwrap();
        assert_eq!(items[0].unit_price, Some(6.5));
        assert_eq!(items[0].price, Some(13.0));
    }
}
