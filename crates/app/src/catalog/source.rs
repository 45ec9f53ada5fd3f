//! Catalog source
//!
//! The public product-listing API. The response envelope is `{ "products": [...] }`.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, de::IgnoredAny};
use thiserror::Error;
use tracing::debug;

/// Errors raised while fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or its body could not be decoded.
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered with a non-success status.
    #[error("catalog request failed with status {0}")]
    Status(StatusCode),

    /// The source answered with no products.
    #[error("catalog source returned no products")]
    Empty,
}

/// Product as returned by the catalog source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    /// Source identifier
    pub id: u64,

    /// Title
    pub title: Option<String>,

    /// Description
    pub description: Option<String>,

    /// Price in the source currency
    pub price: Option<Decimal>,

    /// Category label
    pub category: Option<String>,

    /// Thumbnail URL
    pub thumbnail: Option<String>,

    /// Image URLs
    pub images: Option<Vec<String>>,

    /// Average rating
    pub rating: Option<f64>,

    /// Units in stock
    pub stock: Option<u32>,

    /// Reviews; only their number is used
    pub reviews: Vec<IgnoredAny>,
}

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Vec<RawProduct>,
}

/// Where raw product listings come from.
#[automock]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one listing of raw products.
    async fn fetch_products(&self) -> Result<Vec<RawProduct>, CatalogError>;
}

/// [`CatalogSource`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    http: Client,
    url: String,
    limit: u32,
}

impl HttpCatalogSource {
    /// Source for `url`, requesting up to `limit` products per fetch.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        limit: u32,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            url: url.into(),
            limit,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_products(&self) -> Result<Vec<RawProduct>, CatalogError> {
        debug!(url = %self.url, limit = self.limit, "fetching catalog");

        let response = self
            .http
            .get(&self.url)
            .query(&[("limit", self.limit)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        let page: ProductsPage = response.json().await?;

        Ok(page.products)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn envelope_tolerates_missing_fields() -> TestResult {
        let page: ProductsPage = serde_json::from_str(
            r#"{"products":[{"id":7,"title":"Mascara","price":9.99,"reviews":[{},{}]},{"id":8}],"total":2}"#,
        )?;

        let [first, second] = page.products.as_slice() else {
            panic!("expected two products");
        };

        assert_eq!(first.price, Some(Decimal::new(999, 2)));
        assert_eq!(first.reviews.len(), 2);
        assert_eq!(second.title, None);
        assert_eq!(second.price, None);

        Ok(())
    }

    #[test]
    fn missing_envelope_is_empty() -> TestResult {
        let page: ProductsPage = serde_json::from_str("{}")?;

        assert!(page.products.is_empty());

        Ok(())
    }
}
