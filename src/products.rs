//! Products

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product identifier, unique across every catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Product
///
/// Prices are expressed in the catalog source currency; see [`crate::pricing`] for the
/// conversion into the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product title
    #[serde(default)]
    pub title: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Unit price in the source currency
    #[serde(default)]
    pub price: Decimal,

    /// Free-text category label
    #[serde(default)]
    pub category: String,

    /// Primary image URL
    #[serde(default)]
    pub image: String,

    /// All image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Average rating, 0 to 5
    #[serde(default)]
    pub rating: f64,

    /// Number of ratings
    #[serde(default)]
    pub rating_count: u32,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,
}

impl Product {
    /// Create a product with the given id, title and price; every other field is empty.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price,
            category: String::new(),
            image: String::new(),
            images: Vec::new(),
            rating: 0.0,
            rating_count: 0,
            stock: 0,
        }
    }

    /// Set the category label.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the rating.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set the stock level.
    #[must_use]
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn product_id_displays_inner_value() {
        let id = ProductId::new("dj-7");

        assert_eq!(id.to_string(), "dj-7");
        assert_eq!(id.as_str(), "dj-7");
    }

    #[test]
    fn missing_fields_default_when_deserializing() -> TestResult {
        let product: Product = serde_json::from_str(r#"{"id":"dj-1","title":"Lamp"}"#)?;

        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.stock, 0);
        assert!(product.category.is_empty());
        assert!(product.images.is_empty());

        Ok(())
    }

    #[test]
    fn builder_sets_fields() {
        let product = Product::new("dj-2", "Desk", Decimal::new(4999, 2))
            .with_category("furniture")
            .with_rating(4.5)
            .with_stock(3);

        assert_eq!(product.category, "furniture");
        assert!((product.rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(product.stock, 3);
    }
}
