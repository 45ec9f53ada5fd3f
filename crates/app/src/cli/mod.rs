use clap::{Parser, Subcommand};
use elancart::{
    catalog::{CatalogStatus, CatalogView},
    products::{Product, ProductId},
};
use elancart_app::{config::AppConfig, context::AppContext, observability::init_subscriber};
use jiff::Timestamp;

mod account;
mod cart;
mod catalog;
mod checkout;
mod favourites;
mod render;

#[derive(Debug, Parser)]
#[command(name = "elancart", about = "ElanCart storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the catalog
    Products(catalog::ProductsArgs),
    /// List catalog categories
    Categories,
    /// Manage the cart
    Cart(cart::CartCommand),
    /// Manage favourites
    Favourites(favourites::FavouritesCommand),
    /// Log in or sign up
    Login(account::LoginArgs),
    /// Log out and clear the session
    Logout,
    /// Show or edit the profile
    Profile(account::ProfileArgs),
    /// Show or change the locale preference
    Locale(account::LocaleArgs),
    /// Select a product for immediate purchase
    BuyNow(checkout::BuyNowArgs),
    /// Check out and pay
    Checkout(checkout::CheckoutArgs),
    /// List placed orders
    Orders,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        init_subscriber(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        let mut context = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Products(args) => catalog::products(&context, args).await,
            Commands::Categories => catalog::categories(&context).await,
            Commands::Cart(command) => cart::run(&mut context, command).await,
            Commands::Favourites(command) => favourites::run(&mut context, command).await,
            Commands::Login(args) => account::login(&mut context, &args),
            Commands::Logout => {
                context.storefront.logout();
                println!("logged out");

                Ok(())
            }
            Commands::Profile(args) => account::profile(&mut context, args),
            Commands::Locale(args) => account::locale(&mut context, args),
            Commands::BuyNow(args) => checkout::buy_now(&mut context, &args).await,
            Commands::Checkout(args) => checkout::run(&mut context, args).await,
            Commands::Orders => account::orders(&context),
        }
    }
}

async fn load_catalog(context: &AppContext) -> Result<CatalogView, String> {
    let mut view = CatalogView::new();
    context.products.load(&mut view, Timestamp::now()).await;

    match view.status() {
        CatalogStatus::Failed(message) if view.products().is_empty() => {
            Err(format!("catalog unavailable: {message}"))
        }
        _ => Ok(view),
    }
}

async fn find_product(context: &AppContext, id: &str) -> Result<Product, String> {
    load_catalog(context)
        .await?
        .product(&ProductId::new(id))
        .cloned()
        .ok_or_else(|| format!("unknown product {id}"))
}
