//! Cart reconciliation and quantity policy.
//!
//! The backend stores a cart as sparse `(productId, qty)` pairs. Everything
//! the user sees (names, prices, totals) is derived by joining those pairs
//! against the catalog with [`reconcile`]. Line items are never edited in
//! place; they are rebuilt from fresh entries after every change.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::types::{Money, Product, ProductId};

/// Errors raised by local cart policy, before any request is made.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product is already in the cart and duplicates are not allowed.
    #[error("Item already in cart. Use the cart sidebar to update quantity or remove item.")]
    AlreadyInCart(ProductId),
}

/// A positive item quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single item.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }
}

/// One product in the user's cart, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product being purchased.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// How many of it.
    pub qty: Quantity,
}

impl CartEntry {
    /// Create a cart entry.
    #[must_use]
    pub const fn new(product_id: ProductId, qty: Quantity) -> Self {
        Self { product_id, qty }
    }
}

/// A cart entry enriched with its product's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// The matched catalog product.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity from the cart entry.
    pub qty: Quantity,
}

impl LineItem {
    /// Unit cost multiplied by quantity.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.product.cost * self.qty.get()
    }
}

/// What a requested quantity means for the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Store exactly this quantity.
    Set(Quantity),
    /// Take the product out of the cart.
    Remove,
}

impl QuantityChange {
    /// Interpret a requested quantity; zero or less removes the item.
    #[must_use]
    pub fn from_requested(requested: i64) -> Self {
        u32::try_from(requested)
            .ok()
            .and_then(Quantity::new)
            .map_or(Self::Remove, Self::Set)
    }

    /// The quantity sent to the backend, where zero means remove.
    #[must_use]
    pub const fn wire_qty(&self) -> u32 {
        match self {
            Self::Set(qty) => qty.get(),
            Self::Remove => 0,
        }
    }
}

/// Options for adding a product to the cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Reject the add if the product is already in the cart.
    pub prevent_duplicate: bool,
}

/// Check an add-to-cart request against the current entries.
///
/// # Errors
///
/// Returns [`CartError::AlreadyInCart`] when `options.prevent_duplicate` is set
/// and `product_id` already has an entry.
pub fn check_add(
    entries: &[CartEntry],
    product_id: &ProductId,
    options: AddOptions,
) -> Result<(), CartError> {
    if options.prevent_duplicate && entries.iter().any(|e| &e.product_id == product_id) {
        return Err(CartError::AlreadyInCart(product_id.clone()));
    }
    Ok(())
}

/// Join cart entries against the catalog.
///
/// Output order follows `entries`. Entries whose product is missing from the
/// catalog (e.g. delisted) are dropped without error.
#[must_use]
pub fn reconcile(entries: &[CartEntry], catalog: &[Product]) -> Vec<LineItem> {
    entries
        .iter()
        .filter_map(|entry| {
            catalog
                .iter()
                .find(|product| product.id == entry.product_id)
                .map(|product| LineItem {
                    product: product.clone(),
                    qty: entry.qty,
                })
        })
        .collect()
}

/// Total value of the line items (Σ qty × cost).
#[must_use]
pub fn total_value(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::subtotal).sum()
}

/// Total number of units across the line items (Σ qty).
#[must_use]
pub fn total_count(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.qty.get())).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::Rating;

    fn product(id: &str, cost: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Fashion".to_owned(),
            cost: Money::from_units(cost),
            rating: Rating::new(4).unwrap(),
            image: format!("https://example.com/{id}.png"),
        }
    }

    fn entry(id: &str, qty: u32) -> CartEntry {
        CartEntry::new(ProductId::new(id), Quantity::new(qty).unwrap())
    }

    #[test]
    fn test_reconcile_single_entry() {
        let catalog = vec![product("A", 100)];
        let items = reconcile(&[entry("A", 2)], &catalog);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id.as_str(), "A");
        assert_eq!(items[0].product.cost, Money::from_units(100));
        assert_eq!(items[0].qty.get(), 2);
        assert_eq!(total_value(&items), Money::from_units(200));
        assert_eq!(total_count(&items), 2);
    }

    #[test]
    fn test_reconcile_drops_unknown_products() {
        let catalog = vec![product("A", 100), product("B", 50)];
        let items = reconcile(&[entry("Z", 1), entry("B", 3), entry("Y", 2)], &catalog);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id.as_str(), "B");
    }

    #[test]
    fn test_reconcile_preserves_entry_order() {
        let catalog = vec![product("A", 1), product("B", 2), product("C", 3)];
        let items = reconcile(&[entry("C", 1), entry("A", 1), entry("B", 1)], &catalog);

        let ids: Vec<_> = items.iter().map(|i| i.product.id.as_str()).collect();
        assert_eq!(ids, ["C", "A", "B"]);
    }

    #[test]
    fn test_totals_of_empty_cart() {
        assert_eq!(total_value(&[]), Money::ZERO);
        assert_eq!(total_count(&[]), 0);
    }

    #[test]
    fn test_total_of_huge_costs_does_not_overflow() {
        let catalog: Vec<Product> = serde_json::from_str(
            r#"[{"_id":"A","name":"Yacht","category":"Luxury","cost":1e28,"rating":5,"image":""}]"#,
        )
        .unwrap();
        let items = reconcile(&[entry("A", 10)], &catalog);

        let total = total_value(&items);
        assert!(total > catalog[0].cost);
        assert_eq!(total_count(&items), 10);
        assert!(Money::from_units(5000).checked_debit(total).is_none());
    }

    #[test]
    fn test_line_item_serializes_flat() {
        let items = reconcile(&[entry("A", 2)], &[product("A", 100)]);
        let json = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(json["_id"], "A");
        assert_eq!(json["qty"], 2);
        assert_eq!(json["name"], "Product A");
    }

    #[test]
    fn test_cart_entry_from_backend_json() {
        let entries: Vec<CartEntry> =
            serde_json::from_str(r#"[{"productId":"KCRwjF7lN97HnEaY","qty":3}]"#).unwrap();
        assert_eq!(entries[0].product_id.as_str(), "KCRwjF7lN97HnEaY");
        assert_eq!(entries[0].qty.get(), 3);
    }

    #[test]
    fn test_cart_entry_rejects_zero_quantity() {
        let result = serde_json::from_str::<CartEntry>(r#"{"productId":"A","qty":0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_quantity_change_from_requested() {
        assert_eq!(
            QuantityChange::from_requested(3),
            QuantityChange::Set(Quantity::new(3).unwrap())
        );
        assert_eq!(QuantityChange::from_requested(0), QuantityChange::Remove);
        assert_eq!(QuantityChange::from_requested(-2), QuantityChange::Remove);
        assert_eq!(QuantityChange::from_requested(0).wire_qty(), 0);
        assert_eq!(QuantityChange::from_requested(7).wire_qty(), 7);
    }

    #[test]
    fn test_check_add_duplicate_policy() {
        let entries = vec![entry("A", 1)];
        let a = ProductId::new("A");
        let strict = AddOptions {
            prevent_duplicate: true,
        };

        assert_eq!(
            check_add(&entries, &a, strict),
            Err(CartError::AlreadyInCart(a.clone()))
        );
        assert!(check_add(&entries, &a, AddOptions::default()).is_ok());
        assert!(check_add(&entries, &ProductId::new("B"), strict).is_ok());
    }

    fn arb_catalog() -> impl Strategy<Value = Vec<Product>> {
        prop::collection::btree_map("[a-f]", 0i64..1_000, 0..6).prop_map(|m| {
            m.into_iter()
                .map(|(id, cost)| product(&id, cost))
                .collect()
        })
    }

    fn arb_entries() -> impl Strategy<Value = Vec<CartEntry>> {
        prop::collection::btree_map("[a-h]", 1u32..20, 0..8)
            .prop_map(|m| m.into_iter().map(|(id, qty)| entry(&id, qty)).collect())
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn prop_reconcile_only_emits_catalog_products(
            catalog in arb_catalog(),
            entries in arb_entries(),
        ) {
            let items = reconcile(&entries, &catalog);
            for item in &items {
                prop_assert!(catalog.iter().any(|p| p.id == item.product.id));
            }
            let matched = entries
                .iter()
                .filter(|e| catalog.iter().any(|p| p.id == e.product_id))
                .count();
            prop_assert_eq!(items.len(), matched);
        }

        #[test]
        fn prop_reconcile_preserves_relative_order(
            catalog in arb_catalog(),
            entries in arb_entries(),
        ) {
            let items = reconcile(&entries, &catalog);
            let expected: Vec<_> = entries
                .iter()
                .filter(|e| catalog.iter().any(|p| p.id == e.product_id))
                .map(|e| e.product_id.clone())
                .collect();
            let actual: Vec<_> = items.iter().map(|i| i.product.id.clone()).collect();
            prop_assert_eq!(actual, expected);
        }

        #[test]
        fn prop_totals_are_linear(
            catalog in arb_catalog(),
            left in arb_entries(),
            right in arb_entries(),
        ) {
            let a = reconcile(&left, &catalog);
            let b = reconcile(&right, &catalog);
            let joined: Vec<_> = a.iter().chain(b.iter()).cloned().collect();

            prop_assert_eq!(total_value(&joined), total_value(&a) + total_value(&b));
            prop_assert_eq!(total_count(&joined), total_count(&a) + total_count(&b));
        }
    }
}
