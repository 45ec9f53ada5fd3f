//! App Context

use std::sync::Arc;

use elancart::{storage::Storage, storefront::Storefront};
use thiserror::Error;

use crate::{
    catalog::{CatalogError, HttpCatalogSource, ProductRepository},
    config::AppConfig,
    payment::PaymentGateway,
    storage::FileStorage,
};

/// Errors raised while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The catalog HTTP client could not be built.
    #[error("failed to build catalog client")]
    Catalog(#[source] CatalogError),
}

/// Everything a command needs.
#[derive(Debug)]
pub struct AppContext {
    /// Persisted session state
    pub storefront: Storefront,

    /// Cached catalog
    pub products: ProductRepository,

    /// Timed payment gateway
    pub gateway: PaymentGateway,
}

impl AppContext {
    /// Build the context from configuration, restoring state from the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage.data_dir));

        let source = HttpCatalogSource::new(
            config.catalog.catalog_url.clone(),
            config.catalog.catalog_limit,
            config.catalog.timeout(),
        )
        .map_err(AppInitError::Catalog)?;

        Ok(Self {
            storefront: Storefront::restore(&storage),
            products: ProductRepository::new(
                Arc::new(source),
                storage,
                config.catalog.cache_ttl(),
                config.catalog.target(),
            ),
            gateway: PaymentGateway::new(config.payment.stage_interval()),
        })
    }
}
