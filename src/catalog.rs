//! Catalog
//!
//! Derivation of the visible catalog from the loaded products: filter, then sort, then
//! paginate. Nothing here is stored; every query recomputes from the product list.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::products::{Product, ProductId};

/// Products per catalog page.
pub const PAGE_SIZE: usize = 12;

/// Catalog filters. Empty strings and absent bounds do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilters {
    /// Exact category, compared trimmed and case-insensitively
    #[serde(default)]
    pub category: String,

    /// Free-text title search
    #[serde(default)]
    pub search_term: String,

    /// Inclusive lower price bound
    #[serde(default)]
    pub min_price: Option<Decimal>,

    /// Inclusive upper price bound
    #[serde(default)]
    pub max_price: Option<Decimal>,
}

/// Catalog sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Title A to Z
    #[default]
    #[serde(rename = "name-asc")]
    TitleAsc,

    /// Title Z to A
    #[serde(rename = "name-desc")]
    TitleDesc,

    /// Cheapest first
    #[serde(rename = "price-asc")]
    PriceAsc,

    /// Most expensive first
    #[serde(rename = "price-desc")]
    PriceDesc,

    /// Best rated first
    #[serde(rename = "rating-desc")]
    RatingDesc,
}

impl SortOrder {
    /// Every sort order.
    pub const ALL: [Self; 5] = [
        Self::TitleAsc,
        Self::TitleDesc,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::RatingDesc,
    ];

    /// Short name, e.g. `price-asc`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TitleAsc => "name-asc",
            Self::TitleDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::RatingDesc => "rating-desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::TitleAsc => compare_titles(a, b),
            Self::TitleDesc => compare_titles(b, a),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::RatingDesc => b.rating.total_cmp(&a.rating),
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Unknown sort order name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == value)
            .ok_or_else(|| UnknownSortOrder(value.to_string()))
    }
}

fn compare_titles(a: &Product, b: &Product) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

fn words(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
}

/// Lowercased search tokens of more than one character.
pub fn search_tokens(query: &str) -> Vec<String> {
    words(query)
        .filter(|word| word.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

/// Whether every token equals or prefixes some word of `title`.
pub fn title_matches(title: &str, tokens: &[String]) -> bool {
    let title = title.to_lowercase();
    let title_words: Vec<&str> = words(&title).collect();

    tokens
        .iter()
        .all(|token| title_words.iter().any(|word| word.starts_with(token.as_str())))
}

fn normalized(value: &str) -> String {
    value.trim().to_lowercase()
}

impl CatalogFilters {
    /// Whether `product` passes the category, search and price filters.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_category(product)
            && title_matches(&product.title, &search_tokens(&self.search_term))
            && self.matches_price(product)
    }

    fn matches_category(&self, product: &Product) -> bool {
        let category = normalized(&self.category);

        category.is_empty() || normalized(&product.category) == category
    }

    fn matches_price(&self, product: &Product) -> bool {
        self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }
}

/// Apply `filters`, then `sort`. Without a sort order the filtered order is kept.
pub fn filter_products<'a>(
    products: &'a [Product],
    filters: &CatalogFilters,
    sort: Option<SortOrder>,
) -> Vec<&'a Product> {
    let category = normalized(&filters.category);
    let tokens = search_tokens(&filters.search_term);

    let mut filtered: Vec<&Product> = products
        .iter()
        .filter(|product| category.is_empty() || normalized(&product.category) == category)
        .filter(|product| title_matches(&product.title, &tokens))
        .filter(|product| filters.matches_price(product))
        .collect();

    if let Some(order) = sort {
        filtered.sort_by(|a, b| order.compare(a, b));
    }

    filtered
}

/// One page of products.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    /// Products on this page
    pub products: Vec<&'a Product>,

    /// Products across every page
    pub total_products: usize,

    /// Number of pages
    pub total_pages: usize,

    /// This page's 1-based number
    pub current_page: usize,
}

/// Slice `products` into the 1-based `page` of [`PAGE_SIZE`] items. Page 0 is treated as 1; a
/// page past the end is empty.
pub fn paginate(products: Vec<&Product>, page: usize) -> Page<'_> {
    let page = page.max(1);
    let total_products = products.len();
    let skip = (page - 1).saturating_mul(PAGE_SIZE);

    Page {
        products: products.into_iter().skip(skip).take(PAGE_SIZE).collect(),
        total_products,
        total_pages: total_products.div_ceil(PAGE_SIZE),
        current_page: page,
    }
}

/// Sorted, de-duplicated, trimmed category labels. Blank labels are skipped.
pub fn categories(products: &[Product]) -> Vec<String> {
    let unique: FxHashSet<&str> = products
        .iter()
        .map(|product| product.category.trim())
        .filter(|category| !category.is_empty())
        .collect();

    let mut categories: Vec<String> = unique.into_iter().map(str::to_string).collect();
    categories.sort();
    categories
}

/// Catalog load status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogStatus {
    /// A fetch is in flight
    #[default]
    Loading,

    /// Products are loaded
    Ready,

    /// The last fetch failed; any previously loaded products stay visible
    Failed(String),
}

/// Catalog View
///
/// Loaded products plus the user's filter, sort and page selection.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    products: Vec<Product>,
    status: CatalogStatus,
    filters: CatalogFilters,
    sort: Option<SortOrder>,
    current_page: usize,
}

impl CatalogView {
    /// Empty view, loading, sorted by title.
    pub fn new() -> Self {
        Self {
            sort: Some(SortOrder::default()),
            current_page: 1,
            ..Self::default()
        }
    }

    /// Load status.
    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    /// Every loaded product.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look a product up by id.
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Mark a fetch as in flight.
    pub fn set_loading(&mut self) {
        self.status = CatalogStatus::Loading;
    }

    /// Replace the loaded products.
    pub fn set_products(&mut self, products: Vec<Product>) {
        debug!(count = products.len(), "catalog loaded");

        self.products = products;
        self.status = CatalogStatus::Ready;
    }

    /// Record a failed fetch. Loaded products are kept.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = CatalogStatus::Failed(message.into());
    }

    /// Current filters.
    pub fn filters(&self) -> &CatalogFilters {
        &self.filters
    }

    /// Replace the filters and return to page 1.
    pub fn set_filters(&mut self, filters: CatalogFilters) {
        self.filters = filters;
        self.current_page = 1;
    }

    /// Edit the filters in place and return to page 1.
    pub fn update_filters(&mut self, update: impl FnOnce(&mut CatalogFilters)) {
        update(&mut self.filters);
        self.current_page = 1;
    }

    /// Current sort order.
    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    /// Change the sort order and return to page 1.
    pub fn set_sort(&mut self, sort: Option<SortOrder>) {
        self.sort = sort;
        self.current_page = 1;
    }

    /// Current 1-based page.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Jump to `page`, at least 1.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Filtered and sorted products.
    pub fn filtered(&self) -> Vec<&Product> {
        filter_products(&self.products, &self.filters, self.sort)
    }

    /// The current page of filtered and sorted products.
    pub fn paginated(&self) -> Page<'_> {
        paginate(self.filtered(), self.current_page)
    }

    /// Category labels of the loaded products.
    pub fn categories(&self) -> Vec<String> {
        categories(&self.products)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn priced(id: &str, price: i64, rating: f64) -> Product {
        Product::new(id, format!("Product {id}"), Decimal::from(price)).with_rating(rating)
    }

    fn catalog(count: usize) -> Vec<Product> {
        (1..=count)
            .map(|n| Product::new(format!("dj-{n}"), format!("Item {n:03}"), Decimal::from(10)))
            .collect()
    }

    #[test]
    fn price_ascending_sort() {
        let products = [priced("a", 10, 3.0), priced("b", 20, 5.0), priced("c", 5, 4.0)];

        let prices: Vec<_> = filter_products(
            &products,
            &CatalogFilters::default(),
            Some(SortOrder::PriceAsc),
        )
        .into_iter()
        .map(|product| product.price)
        .collect();

        assert_eq!(prices, [Decimal::from(5), Decimal::from(10), Decimal::from(20)]);
    }

    #[test]
    fn rating_descending_sort() {
        let products = [priced("a", 10, 3.0), priced("b", 20, 5.0), priced("c", 5, 4.0)];

        let ids: Vec<_> = filter_products(
            &products,
            &CatalogFilters::default(),
            Some(SortOrder::RatingDesc),
        )
        .into_iter()
        .map(|product| product.id.as_str())
        .collect();

        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn no_sort_keeps_source_order() {
        let products = [priced("z", 10, 3.0), priced("a", 20, 5.0)];

        let ids: Vec<_> = filter_products(&products, &CatalogFilters::default(), None)
            .into_iter()
            .map(|product| product.id.as_str())
            .collect();

        assert_eq!(ids, ["z", "a"]);
    }

    #[test]
    fn title_sort_ignores_case() {
        let products = [
            Product::new("1", "banana", Decimal::ONE),
            Product::new("2", "Apple", Decimal::ONE),
            Product::new("3", "cherry", Decimal::ONE),
        ];

        let titles: Vec<_> = filter_products(
            &products,
            &CatalogFilters::default(),
            Some(SortOrder::TitleAsc),
        )
        .into_iter()
        .map(|product| product.title.as_str())
        .collect();

        assert_eq!(titles, ["Apple", "banana", "cherry"]);
    }

    #[test]
    fn search_matches_word_prefixes_only() {
        let title = "Wireless Mouse";

        assert!(title_matches(title, &search_tokens("wire")));
        assert!(title_matches(title, &search_tokens("WIRELESS")));
        assert!(title_matches(title, &search_tokens("mou wire")));
        assert!(!title_matches(title, &search_tokens("ouse")));
        assert!(!title_matches(title, &search_tokens("wireless keyboard")));
    }

    #[test]
    fn single_character_tokens_are_ignored() {
        assert!(search_tokens("a b").is_empty());
        assert!(title_matches("Anything", &search_tokens("x")));
    }

    #[test]
    fn category_filter_is_trimmed_and_case_insensitive() {
        let products = [
            Product::new("1", "Lamp", Decimal::ONE).with_category(" Home-Decoration "),
            Product::new("2", "Phone", Decimal::ONE).with_category("smartphones"),
        ];
        let filters = CatalogFilters {
            category: "home-decoration".to_string(),
            ..CatalogFilters::default()
        };

        let filtered = filter_products(&products, &filters, None);

        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn price_range_is_inclusive() {
        let products = [priced("a", 10, 0.0), priced("b", 20, 0.0), priced("c", 30, 0.0)];
        let filters = CatalogFilters {
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::from(20)),
            ..CatalogFilters::default()
        };

        let filtered = filter_products(&products, &filters, None);

        assert_eq!(filtered.len(), 2);
        assert!(products.iter().take(2).all(|product| filters.matches(product)));
    }

    #[test]
    fn hundred_products_make_nine_pages() {
        let products = catalog(100);

        let page = paginate(products.iter().collect(), 1);

        assert_eq!(page.products.len(), PAGE_SIZE);
        assert_eq!(page.total_products, 100);
        assert_eq!(page.total_pages, 9);
        assert_eq!(
            page.products.first().map(|product| product.id.as_str()),
            Some("dj-1")
        );

        let last = paginate(products.iter().collect(), 9);
        assert_eq!(last.products.len(), 4);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let products = catalog(5);

        let page = paginate(products.iter().collect(), 3);

        assert!(page.products.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn changing_filters_or_sort_resets_page() {
        let mut view = CatalogView::new();
        view.set_products(catalog(100));

        view.set_current_page(4);
        view.update_filters(|filters| filters.search_term = "item".to_string());
        assert_eq!(view.current_page(), 1);

        view.set_current_page(4);
        view.set_sort(Some(SortOrder::PriceDesc));
        assert_eq!(view.current_page(), 1);

        view.set_current_page(0);
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn failed_fetch_keeps_loaded_products() {
        let mut view = CatalogView::new();
        view.set_products(catalog(3));

        view.set_error("network down");

        assert_eq!(view.status(), &CatalogStatus::Failed("network down".to_string()));
        assert_eq!(view.paginated().total_products, 3);
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let products = [
            Product::new("1", "a", Decimal::ONE).with_category("laptops"),
            Product::new("2", "b", Decimal::ONE).with_category(" beauty"),
            Product::new("3", "c", Decimal::ONE).with_category("laptops"),
            Product::new("4", "d", Decimal::ONE),
        ];

        assert_eq!(categories(&products), ["beauty", "laptops"]);
    }

    #[test]
    fn sort_order_names_round_trip() -> TestResult {
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>()?, order);
        }

        assert!("newest".parse::<SortOrder>().is_err());

        Ok(())
    }
}
