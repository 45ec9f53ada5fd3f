//! Catalog normalisation
//!
//! Raw listings become [`Product`]s with `dj-` identifiers. Duplicates by title and category
//! are dropped, then the list is cycled into numbered clones or truncated until it holds the
//! configured number of products.

use elancart::products::{Product, ProductId};
use rustc_hash::FxHashSet;

use crate::catalog::source::RawProduct;

/// Map one raw listing entry.
pub fn map_product(raw: RawProduct) -> Product {
    let thumbnail = raw.thumbnail.unwrap_or_default();
    let images = raw.images.unwrap_or_default();

    let image = if thumbnail.is_empty() {
        images.first().cloned().unwrap_or_default()
    } else {
        thumbnail.clone()
    };

    let images = if images.is_empty() && !thumbnail.is_empty() {
        vec![thumbnail]
    } else {
        images
    };

    Product {
        id: ProductId::new(format!("dj-{}", raw.id)),
        title: raw.title.unwrap_or_default().trim().to_string(),
        description: raw.description.unwrap_or_default().trim().to_string(),
        price: raw.price.unwrap_or_default(),
        category: raw.category.unwrap_or_default().trim().to_string(),
        image,
        images,
        rating: raw.rating.unwrap_or_default(),
        rating_count: u32::try_from(raw.reviews.len()).unwrap_or(u32::MAX),
        stock: raw.stock.unwrap_or_default(),
    }
}

/// Drop products whose lowercased, trimmed title and category were already seen.
pub fn dedupe(products: Vec<Product>) -> Vec<Product> {
    let mut seen = FxHashSet::default();

    products
        .into_iter()
        .filter(|product| {
            seen.insert((
                product.title.trim().to_lowercase(),
                product.category.trim().to_lowercase(),
            ))
        })
        .collect()
}

/// Truncate to `target` products, or cycle through them appending numbered clones.
pub fn fit_to_target(mut products: Vec<Product>, target: usize) -> Vec<Product> {
    if products.len() >= target {
        products.truncate(target);

        return products;
    }

    let missing = target - products.len();

    let clones: Vec<Product> = products
        .iter()
        .cycle()
        .take(missing)
        .zip(1_usize..)
        .map(|(base, n)| Product {
            id: ProductId::new(format!("{}-clone-{n}", base.id)),
            title: format!("{} ({n})", base.title),
            ..base.clone()
        })
        .collect();

    products.extend(clones);
    products
}

/// Full pipeline: map, de-duplicate and, when `target` is set, fit to it.
pub fn normalize(raw: Vec<RawProduct>, target: Option<usize>) -> Vec<Product> {
    let products = dedupe(raw.into_iter().map(map_product).collect());

    match target {
        Some(target) => fit_to_target(products, target),
        None => products,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn raw(id: u64, title: &str, category: &str) -> RawProduct {
        RawProduct {
            id,
            title: Some(title.to_string()),
            category: Some(category.to_string()),
            price: Some(Decimal::from(id)),
            ..RawProduct::default()
        }
    }

    #[test]
    fn maps_identifiers_images_and_defaults() {
        let product = map_product(RawProduct {
            images: Some(vec!["a.png".to_string(), "b.png".to_string()]),
            ..raw(3, " Lipstick ", " beauty ")
        });

        assert_eq!(product.id.as_str(), "dj-3");
        assert_eq!(product.title, "Lipstick");
        assert_eq!(product.category, "beauty");
        assert_eq!(product.image, "a.png");
        assert_eq!(product.stock, 0);
        assert_eq!(product.rating_count, 0);

        let thumbnail_only = map_product(RawProduct {
            thumbnail: Some("t.png".to_string()),
            ..raw(4, "Mascara", "beauty")
        });

        assert_eq!(thumbnail_only.image, "t.png");
        assert_eq!(thumbnail_only.images, ["t.png"]);
    }

    #[test]
    fn duplicates_ignore_case_and_whitespace() {
        let products = normalize(
            vec![
                raw(1, "Desk Lamp", "furniture"),
                raw(2, "desk lamp ", "Furniture"),
                raw(3, "Desk Lamp", "lighting"),
            ],
            None,
        );

        let ids: Vec<&str> = products.iter().map(|product| product.id.as_str()).collect();

        assert_eq!(ids, ["dj-1", "dj-3"]);
    }

    #[test]
    fn short_catalog_is_padded_with_numbered_clones() {
        let products = normalize(vec![raw(1, "Lamp", "a"), raw(2, "Desk", "b")], Some(5));

        let titles: Vec<&str> = products.iter().map(|product| product.title.as_str()).collect();

        assert_eq!(titles, ["Lamp", "Desk", "Lamp (1)", "Desk (2)", "Lamp (3)"]);
        assert_eq!(
            products.last().map(|product| product.id.as_str()),
            Some("dj-1-clone-3")
        );
    }

    #[test]
    fn long_catalog_is_truncated() {
        let raw = (1..=8).map(|n| raw(n, &format!("Item {n}"), "misc")).collect();

        assert_eq!(normalize(raw, Some(5)).len(), 5);
    }

    #[test]
    fn empty_catalog_stays_empty() {
        assert!(normalize(Vec::new(), Some(100)).is_empty());
    }
}
