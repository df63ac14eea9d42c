//! In-memory order cart
//!
//! Entries are unique by product id and always carry a positive quantity.
//! Pricing is never computed here; the service quotes it (see `PriceQuote`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{MenuItem, OrderItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, product_id: i64) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Add `quantity` units of `product`, merging with an existing entry.
    ///
    /// A zero quantity is ignored. Returns whether the cart changed.
    pub fn add_item(&mut self, product: &MenuItem, quantity: u32) -> bool {
        if quantity == 0 {
            tracing::debug!(product_id = product.id, "ignoring add with zero quantity");
            return false;
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product.id)
        {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            });
        }
        true
    }

    /// Drop the entry for `product_id`. Returns whether anything was removed.
    pub fn remove_item(&mut self, product_id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `{productId, productQuantity}` pairs, in insertion order.
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                product_quantity: item.quantity,
            })
            .collect()
    }
}
