use clap::Args;
use elancart::{
    catalog::{CatalogFilters, SortOrder},
    pricing::{format_amount, to_display},
};
use elancart_app::context::AppContext;
use rust_decimal::Decimal;

use super::{load_catalog, render};

#[derive(Debug, Args)]
pub(crate) struct ProductsArgs {
    /// Only products in this category
    #[arg(long, default_value = "")]
    category: String,

    /// Title search
    #[arg(long, default_value = "")]
    search: String,

    /// Sort order (name-asc, name-desc, price-asc, price-desc, rating-desc)
    #[arg(long, default_value_t = SortOrder::TitleAsc)]
    sort: SortOrder,

    /// Inclusive lower price bound, in the source currency
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Inclusive upper price bound, in the source currency
    #[arg(long)]
    max_price: Option<Decimal>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: usize,
}

pub(crate) async fn products(context: &AppContext, args: ProductsArgs) -> Result<(), String> {
    let mut view = load_catalog(context).await?;

    view.set_filters(CatalogFilters {
        category: args.category,
        search_term: args.search,
        min_price: args.min_price,
        max_price: args.max_price,
    });
    view.set_sort(Some(args.sort));
    view.set_current_page(args.page);

    let page = view.paginated();

    if page.total_products == 0 {
        println!("no products match");
        return Ok(());
    }

    let rows = page.products.iter().map(|product| {
        [
            product.id.to_string(),
            product.title.clone(),
            product.category.clone(),
            format_amount(to_display(product.price)),
            format!("{:.1}", product.rating),
        ]
    });

    println!(
        "{}",
        render::table(["Id", "Title", "Category", "Price", "Rating"], rows, 3..5)
    );
    println!(
        "page {} of {} ({} products)",
        page.current_page, page.total_pages, page.total_products
    );

    Ok(())
}

pub(crate) async fn categories(context: &AppContext) -> Result<(), String> {
    for category in load_catalog(context).await?.categories() {
        println!("{category}");
    }

    Ok(())
}
