//! Catalog Config

use std::time::Duration;

use clap::Args;
use jiff::SignedDuration;

/// Catalog source and cache settings.
#[derive(Debug, Args)]
pub struct CatalogConfig {
    /// Product listing endpoint
    #[arg(
        long,
        env = "CATALOG_URL",
        default_value = "https://dummyjson.com/products"
    )]
    pub catalog_url: String,

    /// Products requested per fetch
    #[arg(long, env = "CATALOG_LIMIT", default_value_t = 100_u32)]
    pub catalog_limit: u32,

    /// Catalog size after padding or truncation; 0 keeps the fetched size
    #[arg(long, env = "CATALOG_TARGET", default_value_t = 100_usize)]
    pub catalog_target: usize,

    /// Seconds a cached catalog stays fresh
    #[arg(long, env = "CATALOG_CACHE_TTL_SECS", default_value_t = 600_i64)]
    pub catalog_cache_ttl_secs: i64,

    /// Request timeout in seconds
    #[arg(long, env = "CATALOG_TIMEOUT_SECS", default_value_t = 10_u64)]
    pub catalog_timeout_secs: u64,
}

impl CatalogConfig {
    /// Catalog cache lifetime.
    #[must_use]
    pub fn cache_ttl(&self) -> SignedDuration {
        SignedDuration::from_secs(self.catalog_cache_ttl_secs)
    }

    /// HTTP request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    /// Padding target, if enabled.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        (self.catalog_target > 0).then_some(self.catalog_target)
    }
}
