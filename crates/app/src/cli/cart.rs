use clap::{Args, Subcommand};
use elancart::{
    cart::CartStore,
    pricing::{cart_summary, format_amount, to_display},
    products::ProductId,
};
use elancart_app::context::AppContext;

use super::{find_product, render};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and its summary
    Show,
    /// Add a product
    Add(AddArgs),
    /// Set a line's quantity; 0 or less removes it
    Set(SetArgs),
    /// Remove a line
    Remove(RemoveArgs),
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id, e.g. dj-1
    id: String,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Product id
    id: String,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

#[derive(Debug, Args)]
struct RemoveArgs {
    /// Product id
    id: String,
}

pub(crate) async fn run(context: &mut AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add(args) => {
            let product = find_product(context, &args.id).await?;
            context
                .storefront
                .cart_mut()
                .add_to_cart(&product, args.quantity);
        }
        CartSubcommand::Set(args) => {
            context
                .storefront
                .cart_mut()
                .update_cart_item_quantity(&ProductId::new(args.id), args.quantity);
        }
        CartSubcommand::Remove(args) => {
            context
                .storefront
                .cart_mut()
                .remove_from_cart(&ProductId::new(args.id));
        }
        CartSubcommand::Clear => {
            context.storefront.cart_mut().clear_cart();
        }
    }

    show(context.storefront.cart());

    Ok(())
}

fn show(cart: &CartStore) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    let rows = cart.lines().iter().map(|line| {
        [
            line.product.id.to_string(),
            line.product.title.clone(),
            line.quantity.to_string(),
            format_amount(to_display(line.product.price)),
            format_amount(to_display(line.line_total())),
        ]
    });

    println!(
        "{}",
        render::table(["Id", "Title", "Qty", "Price", "Total"], rows, 2..5)
    );
    println!("{}", render::amounts(&cart_summary(cart.lines()).rounded()));
}
