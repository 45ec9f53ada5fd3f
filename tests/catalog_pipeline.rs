//! Integration tests for catalog filtering, sorting and pagination

use rust_decimal::Decimal;
use testresult::TestResult;

use elancart::{
    catalog::{CatalogFilters, CatalogStatus, CatalogView, PAGE_SIZE, SortOrder},
    products::{Product, ProductId},
};

fn catalog() -> Vec<Product> {
    let mut products = vec![
        Product::new("dj-1", "Red Lipstick", Decimal::new(1299, 2))
            .with_category("beauty")
            .with_rating(4.2),
        Product::new("dj-2", "red lipstick", Decimal::new(999, 2))
            .with_category("beauty")
            .with_rating(3.9),
        Product::new("dj-3", "Wooden Desk", Decimal::from(250))
            .with_category("furniture")
            .with_rating(4.8),
        Product::new("dj-4", "Desk Lamp", Decimal::from(35))
            .with_category(" furniture ")
            .with_rating(4.1),
    ];

    products.extend((5..=30).map(|n| {
        Product::new(
            format!("dj-{n}"),
            format!("Grocery Item {n:02}"),
            Decimal::from(n),
        )
        .with_category("groceries")
    }));

    products
}

fn ids(view: &CatalogView) -> Vec<String> {
    view.paginated()
        .products
        .iter()
        .map(|product| product.id.to_string())
        .collect()
}

#[test]
fn filters_sort_then_paginate() {
    let mut view = CatalogView::new();
    view.set_products(catalog());

    view.update_filters(|filters| filters.category = "Furniture".to_string());
    view.set_sort(Some(SortOrder::PriceAsc));

    assert_eq!(ids(&view), ["dj-4", "dj-3"]);

    view.set_sort(Some(SortOrder::RatingDesc));

    assert_eq!(ids(&view), ["dj-3", "dj-4"]);
}

#[test]
fn title_sort_is_case_insensitive_with_stable_tie_break() {
    let mut view = CatalogView::new();
    view.set_products(catalog());
    view.set_filters(CatalogFilters {
        search_term: "lip".to_string(),
        ..CatalogFilters::default()
    });

    // Equal ignoring case; the ordinal tie-break puts the capitalised title first.
    assert_eq!(ids(&view), ["dj-1", "dj-2"]);

    view.set_sort(Some(SortOrder::TitleDesc));

    assert_eq!(ids(&view), ["dj-2", "dj-1"]);
}

#[test]
fn price_bounds_are_inclusive_and_optional() {
    let mut view = CatalogView::new();
    view.set_products(catalog());
    view.set_filters(CatalogFilters {
        min_price: Some(Decimal::from(10)),
        max_price: Some(Decimal::from(12)),
        ..CatalogFilters::default()
    });

    assert_eq!(view.filtered().len(), 3);

    view.update_filters(|filters| filters.max_price = None);

    assert!(
        view.filtered()
            .iter()
            .all(|product| product.price >= Decimal::from(10))
    );
}

#[test]
fn pages_cover_every_product_once() {
    let mut view = CatalogView::new();
    view.set_products(catalog());

    let first = view.paginated();
    assert_eq!(first.total_products, 30);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.products.len(), PAGE_SIZE);

    let mut seen = Vec::new();
    for page in 1..=3 {
        view.set_current_page(page);
        seen.extend(ids(&view));
    }
    seen.sort();
    seen.dedup();

    assert_eq!(seen.len(), 30);

    view.set_current_page(4);
    assert!(view.paginated().products.is_empty());
}

#[test]
fn filter_change_returns_to_first_page() {
    let mut view = CatalogView::new();
    view.set_products(catalog());
    view.set_current_page(3);

    view.update_filters(|filters| filters.search_term = "grocery".to_string());

    assert_eq!(view.current_page(), 1);

    view.set_current_page(0);

    assert_eq!(view.current_page(), 1);
}

#[test]
fn categories_are_trimmed_and_unique() {
    let mut view = CatalogView::new();
    view.set_products(catalog());

    assert_eq!(view.categories(), ["beauty", "furniture", "groceries"]);
}

#[test]
fn failed_refresh_keeps_loaded_products() {
    let mut view = CatalogView::new();
    assert_eq!(view.status(), &CatalogStatus::Loading);

    view.set_products(catalog());
    view.set_error("network unreachable");

    assert_eq!(
        view.status(),
        &CatalogStatus::Failed("network unreachable".to_string())
    );

    let Some(lamp) = view.product(&ProductId::new("dj-4")) else {
        panic!("lamp should still be loaded");
    };
    assert_eq!(lamp.title, "Desk Lamp");
}

#[test]
fn sort_orders_parse_from_their_names() -> TestResult {
    for order in SortOrder::ALL {
        assert_eq!(order.as_str().parse::<SortOrder>()?, order);
    }

    assert!("cheapest".parse::<SortOrder>().is_err());

    Ok(())
}
