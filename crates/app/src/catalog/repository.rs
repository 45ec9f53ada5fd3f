//! Product Repository
//!
//! Serves the catalog from the local cache while it is fresh and complete, otherwise from the
//! catalog source. A failed or empty fetch is retried once before it is reported.

use std::sync::Arc;

use elancart::{
    catalog::CatalogView,
    products::Product,
    storage::{Storage, StorageExt, keys},
};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{
    normalize::normalize,
    source::{CatalogError, CatalogSource, RawProduct},
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedCatalog {
    #[serde(default)]
    products: Vec<Product>,

    fetched_at: Timestamp,
}

/// Cached product repository.
pub struct ProductRepository {
    source: Arc<dyn CatalogSource>,
    storage: Arc<dyn Storage>,
    ttl: SignedDuration,
    target: Option<usize>,
}

impl std::fmt::Debug for ProductRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRepository")
            .field("ttl", &self.ttl)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl ProductRepository {
    /// Repository reading from `source` and caching in `storage` for `ttl`. With a `target`,
    /// fetched catalogs are fitted to that many products and smaller caches are ignored.
    pub fn new(
        source: Arc<dyn CatalogSource>,
        storage: Arc<dyn Storage>,
        ttl: SignedDuration,
        target: Option<usize>,
    ) -> Self {
        Self {
            source,
            storage,
            ttl,
            target,
        }
    }

    /// Cached catalog if it is younger than the TTL at `now` and large enough.
    pub fn cached(&self, now: Timestamp) -> Option<Vec<Product>> {
        let cached = match self.storage.read_json::<CachedCatalog>(keys::PRODUCTS) {
            Ok(cached) => cached?,
            Err(error) => {
                warn!(%error, "ignoring cached catalog");

                return None;
            }
        };

        let age = now.duration_since(cached.fetched_at);
        let minimum = self.target.unwrap_or(1);

        if age >= self.ttl || cached.products.len() < minimum {
            debug!(%age, count = cached.products.len(), "cached catalog is stale");

            return None;
        }

        Some(cached.products)
    }

    /// Fetch from the source, retrying once, then normalise and cache the result.
    ///
    /// # Errors
    ///
    /// Returns the error of the second attempt when both attempts fail or come back empty.
    pub async fn fetch(&self, now: Timestamp) -> Result<Vec<Product>, CatalogError> {
        let raw = match self.attempt().await {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "catalog fetch failed, retrying");

                self.attempt().await?
            }
        };

        let products = normalize(raw, self.target);

        info!(count = products.len(), "catalog fetched");

        self.storage.persist(
            keys::PRODUCTS,
            &CachedCatalog {
                products: products.clone(),
                fetched_at: now,
            },
        );

        Ok(products)
    }

    /// Fill `view` from the cache or the source. The view is only touched once the outcome is
    /// known, so dropping the future mid-fetch leaves it as it was.
    pub async fn load(&self, view: &mut CatalogView, now: Timestamp) {
        if let Some(products) = self.cached(now) {
            debug!(count = products.len(), "catalog served from cache");
            view.set_products(products);

            return;
        }

        self.refresh(view, now).await;
    }

    /// Fill `view` from the source, bypassing the cache.
    pub async fn refresh(&self, view: &mut CatalogView, now: Timestamp) {
        match self.fetch(now).await {
            Ok(products) => view.set_products(products),
            Err(error) => {
                warn!(%error, "catalog unavailable");
                view.set_error(error.to_string());
            }
        }
    }

    async fn attempt(&self) -> Result<Vec<RawProduct>, CatalogError> {
        let raw = self.source.fetch_products().await?;

        if raw.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(raw)
    }
}
