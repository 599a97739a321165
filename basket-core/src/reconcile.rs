//! Price/quantity reconciliation engine.
//!
//! Given an item and the field the user just edited, computes the other two
//! dependent fields so that `price == round2(reference_quantity * unit_price)`
//! holds whenever both sides are known. Pure and deterministic; the caller
//! applies the returned patch and owns persistence.

use crate::{round2, EditedField, ShoppingItem};
use serde::{Deserialize, Serialize};

/// Patch over the price tuple of an item. Only the fields the engine decided
/// to set are present; absent fields are left untouched on apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePatch {
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub price: Option<f64>,
}

impl PricePatch {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.unit_price.is_none() && self.price.is_none()
    }

    /// Apply the patch to an item, leaving absent fields unchanged.
    pub fn apply(&self, item: &mut ShoppingItem) {
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit_price) = self.unit_price {
            item.unit_price = Some(unit_price);
        }
        if let Some(price) = self.price {
            item.price = Some(price);
        }
    }
}

/// Recompute the dependent price fields after a single-field edit.
///
/// The reference quantity is taken from the post-edit quantity when quantity
/// itself changed. When both `unit_price` and `price` are known and the
/// quantity changes, the total is recomputed from the unit price: the unit
/// price is the anchor, usually copied verbatim from a price tag, while the
/// total is a derived convenience figure.
///
/// Division is guarded: a zero reference quantity leaves the dependent field
/// untouched instead of producing an infinity or NaN.
pub fn reconcile(item: &ShoppingItem, field: EditedField, value: f64) -> PricePatch {
    let mut patch = PricePatch::default();
    match field {
        EditedField::Quantity => {
            patch.quantity = Some(value);
            let ref_qty = item.unit.to_reference(value);
            if let Some(unit_price) = item.unit_price {
                patch.price = Some(round2(ref_qty * unit_price));
            } else if let Some(price) = item.price {
                if ref_qty > 0.0 {
                    patch.unit_price = Some(round2(price / ref_qty));
                }
            }
        }
        EditedField::UnitPrice => {
            patch.unit_price = Some(value);
            let ref_qty = item.reference_quantity();
            if ref_qty > 0.0 {
                patch.price = Some(round2(ref_qty * value));
            }
        }
        EditedField::Price => {
            patch.price = Some(value);
            let ref_qty = item.reference_quantity();
            if ref_qty > 0.0 {
                patch.unit_price = Some(round2(value / ref_qty));
            }
        }
    }
    patch
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::{ListId, EntityIdType, ShoppingItem, Unit};
    use chrono::Utc;
    use proptest::prelude::*;

    fn arb_unit() -> impl Strategy<Value = Unit> {
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

    fn arb_item() -> impl Strategy<Value = ShoppingItem> {
        (arb_unit(), 0.01f64..100_000.0).prop_map(|(unit, quantity)| {
            ShoppingItem::new(ListId::generate(), "prop item", quantity, unit, Utc::now()).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// With unit_price set, editing quantity yields
        /// price == round2(to_reference(q) * unit_price).
        #[test]
        fn prop_quantity_edit_matches_anchor_formula(
            item in arb_item(),
            unit_price in 0.01f64..10_000.0,
            new_quantity in 0.01f64..100_000.0,
        ) {
            let mut item = item;
            item.unit_price = Some(unit_price);
            let patch = reconcile(&item, EditedField::Quantity, new_quantity);
            let expected = round2(item.unit.to_reference(new_quantity) * unit_price);
            prop_assert_eq!(patch.price, Some(expected));
        }

        /// With quantity > 0, editing price yields
        /// unit_price == round2(p / to_reference(quantity)).
        #[test]
        fn prop_price_edit_matches_division_formula(
            item in arb_item(),
            new_price in 0.0f64..100_000.0,
        ) {
            let patch = reconcile(&item, EditedField::Price, new_price);
            let ref_qty = item.reference_quantity();
            prop_assume!(ref_qty > 0.0);
            prop_assert_eq!(patch.unit_price, Some(round2(new_price / ref_qty)));
        }

        /// The engine is deterministic: identical inputs, identical patch.
        #[test]
        fn prop_reconcile_is_deterministic(
            item in arb_item(),
            value in 0.01f64..10_000.0,
        ) {
            for field in [EditedField::Quantity, EditedField::UnitPrice, EditedField::Price] {
                prop_assert_eq!(
                    reconcile(&item, field, value),
                    reconcile(&item, field, value)
                );
            }
        }

        /// Applying a patch always restores the price invariant when both
        /// sides of the tuple are known afterwards.
        #[test]
        fn prop_patch_restores_invariant(
            item in arb_item(),
            unit_price in 0.01f64..10_000.0,
            new_quantity in 0.01f64..100_000.0,
        ) {
            let mut item = item;
            item.unit_price = Some(unit_price);
            let patch = reconcile(&item, EditedField::Quantity, new_quantity);
            patch.apply(&mut item);
            let expected = round2(item.reference_quantity() * item.unit_price.unwrap());
            prop_assert_eq!(item.price, Some(expected));
        }
    }
}
