//! Application configuration

use clap::Args;

use crate::config::{
    catalog::CatalogConfig, observability::LoggingConfig, payment::PaymentConfig,
    storage::StorageConfig,
};

pub mod catalog;
pub mod observability;
pub mod payment;
pub mod storage;

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Local state settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Catalog source and cache settings.
    #[command(flatten)]
    pub catalog: CatalogConfig,

    /// Payment simulator settings.
    #[command(flatten)]
    pub payment: PaymentConfig,
}
