//! Cart

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    products::{Product, ProductId},
    storage::{Storage, StorageExt, keys},
};

/// A product snapshot with a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product snapshot taken when the line was created
    pub product: Product,

    /// Number of units, always at least 1
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartLine {
    /// Create a new line.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Line total in the source currency, unrounded.
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Cart lines and the derived total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Cart lines, at most one per product id
    #[serde(default)]
    pub items: Vec<CartLine>,

    /// Sum of every line total, rounded to 2 decimal places
    #[serde(default)]
    pub total: Decimal,
}

impl CartState {
    /// Sum of `price * quantity` over the given lines, rounded to 2 decimal places.
    pub fn total_of(items: &[CartLine]) -> Decimal {
        items
            .iter()
            .map(CartLine::line_total)
            .sum::<Decimal>()
            .round_dp(2)
    }

    fn recalculate(&mut self) {
        self.total = Self::total_of(&self.items);
    }

    /// Merge lines sharing a product id into the first of them and drop empty lines.
    fn merge_lines(&mut self) {
        let mut merged: Vec<CartLine> = Vec::with_capacity(self.items.len());

        for line in self.items.drain(..).filter(|line| line.quantity > 0) {
            match merged
                .iter_mut()
                .find(|existing| existing.product.id == line.product.id)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => merged.push(line),
            }
        }

        self.items = merged;
    }
}

/// Cart Store
///
/// Owns the cart lines. Every mutation recomputes the total from scratch and persists the
/// whole state.
pub struct CartStore {
    storage: Arc<dyn Storage>,
    state: CartState,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Restore the cart from storage. A malformed blob yields an empty cart; repeated product
    /// ids are merged and zero-quantity lines dropped.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let mut state: CartState = storage.restore_or_default(keys::CART);

        state.merge_lines();
        state.recalculate();

        Self { storage, state }
    }

    /// Current state.
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// Current lines.
    pub fn lines(&self) -> &[CartLine] {
        &self.state.items
    }

    /// Current total in the source currency.
    pub fn total(&self) -> Decimal {
        self.state.total
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u32 {
        self.state.items.iter().map(|line| line.quantity).sum()
    }

    /// Whether a line exists for `id`.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.line(id).is_some()
    }

    /// The line for `id`, if any.
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.state.items.iter().find(|line| &line.product.id == id)
    }

    /// Add `quantity` units of `product`, merging into an existing line. A quantity of 0 is
    /// treated as 1.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> &CartState {
        let quantity = quantity.max(1);

        match self
            .state
            .items
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self
                .state
                .items
                .push(CartLine::new(product.clone(), quantity)),
        }

        debug!(product = %product.id, quantity, "added to cart");

        self.commit()
    }

    /// Remove the line for `id`; no-op when absent.
    pub fn remove_from_cart(&mut self, id: &ProductId) -> &CartState {
        self.state.items.retain(|line| &line.product.id != id);

        self.commit()
    }

    /// Set the quantity of the line for `id`. A quantity of 0 or less removes the line.
    pub fn update_cart_item_quantity(&mut self, id: &ProductId, quantity: i64) -> &CartState {
        let Ok(quantity @ 1..) = u32::try_from(quantity.min(i64::from(u32::MAX))) else {
            return self.remove_from_cart(id);
        };

        if let Some(line) = self
            .state
            .items
            .iter_mut()
            .find(|line| &line.product.id == id)
        {
            line.quantity = quantity;
        }

        self.commit()
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) -> &CartState {
        self.state.items.clear();

        self.commit()
    }

    /// Clear the cart and delete its persisted copy.
    pub fn purge(&mut self) {
        self.state = CartState::default();
        self.storage.forget(keys::CART);

        debug!("cart purged");
    }

    fn commit(&mut self) -> &CartState {
        self.state.recalculate();
        self.storage.persist(keys::CART, &self.state);

        &self.state
    }
}
