use clap::{Args, Subcommand};
use elancart::pricing::{format_amount, to_display};
use elancart_app::context::AppContext;

use super::{find_product, render};

#[derive(Debug, Args)]
pub(crate) struct FavouritesCommand {
    #[command(subcommand)]
    command: FavouritesSubcommand,
}

#[derive(Debug, Subcommand)]
enum FavouritesSubcommand {
    /// List favourites
    List,
    /// Add or remove a product
    Toggle(ToggleArgs),
}

#[derive(Debug, Args)]
struct ToggleArgs {
    /// Product id, e.g. dj-1
    id: String,
}

pub(crate) async fn run(
    context: &mut AppContext,
    command: FavouritesCommand,
) -> Result<(), String> {
    if let FavouritesSubcommand::Toggle(args) = command.command {
        let product = find_product(context, &args.id).await?;
        let added = context.storefront.favourites_mut().toggle_favourite(&product);

        println!(
            "{} {}",
            product.title,
            if added { "added to favourites" } else { "removed from favourites" }
        );
    }

    let favourites = context.storefront.favourites();

    if favourites.count() == 0 {
        println!("no favourites yet");
        return Ok(());
    }

    let rows = favourites.items().iter().map(|product| {
        [
            product.id.to_string(),
            product.title.clone(),
            format_amount(to_display(product.price)),
        ]
    });

    println!("{}", render::table(["Id", "Title", "Price"], rows, 2..3));

    Ok(())
}
