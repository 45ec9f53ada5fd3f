//! Favourites

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    products::{Product, ProductId},
    storage::{Storage, StorageExt, keys},
};

/// Liked products, at most one entry per product id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavouritesState {
    /// Favourite product snapshots
    #[serde(default)]
    pub items: Vec<Product>,
}

/// Favourites Store
pub struct FavouritesStore {
    storage: Arc<dyn Storage>,
    state: FavouritesState,
}

impl std::fmt::Debug for FavouritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavouritesStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FavouritesStore {
    /// Restore favourites from storage. A malformed blob yields an empty set and repeated ids
    /// keep their first entry.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let mut state: FavouritesState = storage.restore_or_default(keys::FAVOURITES);

        let mut seen = FxHashSet::default();
        state.items.retain(|product| seen.insert(product.id.clone()));

        Self { storage, state }
    }

    /// Current state.
    pub fn state(&self) -> &FavouritesState {
        &self.state
    }

    /// Favourite products in insertion order.
    pub fn items(&self) -> &[Product] {
        &self.state.items
    }

    /// Number of favourites.
    pub fn count(&self) -> usize {
        self.state.items.len()
    }

    /// Whether `id` is a favourite.
    pub fn is_favourite(&self, id: &ProductId) -> bool {
        self.state.items.iter().any(|product| &product.id == id)
    }

    /// Add `product`; no-op when already present.
    pub fn add_to_favourites(&mut self, product: &Product) -> &FavouritesState {
        if self.is_favourite(&product.id) {
            return &self.state;
        }

        self.state.items.push(product.clone());

        self.commit()
    }

    /// Remove the favourite for `id`; no-op when absent.
    pub fn remove_from_favourites(&mut self, id: &ProductId) -> &FavouritesState {
        self.state.items.retain(|product| &product.id != id);

        self.commit()
    }

    /// Flip membership of `product`. Returns whether it is a favourite afterwards.
    pub fn toggle_favourite(&mut self, product: &Product) -> bool {
        if self.is_favourite(&product.id) {
            self.remove_from_favourites(&product.id);

            false
        } else {
            self.add_to_favourites(product);

            true
        }
    }

    /// Remove every favourite.
    pub fn clear_favourites(&mut self) -> &FavouritesState {
        self.state.items.clear();

        self.commit()
    }

    /// Clear favourites and delete the persisted copy.
    pub fn purge(&mut self) {
        self.state = FavouritesState::default();
        self.storage.forget(keys::FAVOURITES);

        debug!("favourites purged");
    }

    fn commit(&mut self) -> &FavouritesState {
        self.storage.persist(keys::FAVOURITES, &self.state);

        &self.state
    }
}
