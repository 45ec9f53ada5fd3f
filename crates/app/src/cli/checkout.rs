use std::{fs, path::PathBuf};

use clap::Args;
use elancart::{
    checkout::{CheckoutEntry, CheckoutForm, SubmitOutcome},
    payment::{PaymentSimulator, Settlement},
    pricing::format_amount,
    storefront::StorefrontError,
};
use elancart_app::{context::AppContext, payment::GatewayOutcome};
use jiff::Timestamp;

use super::{find_product, render};

#[derive(Debug, Args)]
pub(crate) struct BuyNowArgs {
    /// Product id, e.g. dj-1
    id: String,

    /// Units to buy
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// JSON file with the checkout form; blank fields are filled from the profile
    #[arg(long)]
    form: PathBuf,

    /// Check out the cart even when a buy-now selection is pending
    #[arg(long)]
    from_cart: bool,
}

pub(crate) async fn buy_now(context: &mut AppContext, args: &BuyNowArgs) -> Result<(), String> {
    let product = find_product(context, &args.id).await?;

    let intent = context
        .storefront
        .buy_now(product, args.quantity, Timestamp::now())
        .map_err(|error| error.to_string())?;

    println!(
        "selected for checkout; run `elancart checkout` within the hour ({} item(s), created {})",
        intent.items.len(),
        intent.created_at
    );

    Ok(())
}

pub(crate) async fn run(context: &mut AppContext, args: CheckoutArgs) -> Result<(), String> {
    let raw = fs::read_to_string(&args.form)
        .map_err(|error| format!("failed to read {}: {error}", args.form.display()))?;
    let form: CheckoutForm =
        serde_json::from_str(&raw).map_err(|error| format!("invalid checkout form: {error}"))?;

    let entry = if args.from_cart {
        CheckoutEntry::from_cart()
    } else {
        CheckoutEntry::default()
    };

    let mut checkout = context
        .storefront
        .begin_checkout(entry, Timestamp::now())
        .map_err(|error| match error {
            StorefrontError::LoginRequired { from } => {
                format!("login required; run `elancart login` and return to {from}")
            }
            other => other.to_string(),
        })?;

    *checkout.form_mut() = form;
    if let Some(user) = context.storefront.identity().current() {
        checkout.form_mut().prefill(user);
    }

    println!("{}", render::amounts(&checkout.amounts().rounded()));

    let draft = match checkout.submit().map_err(|error| error.to_string())? {
        SubmitOutcome::Ready(draft) => *draft,
        SubmitOutcome::Invalid { .. } => {
            for (field, message) in checkout.errors().iter() {
                println!("{field}: {message}");
            }

            return Err(checkout.message().unwrap_or_default().to_string());
        }
        SubmitOutcome::TermsRequired => {
            return Err(checkout.message().unwrap_or_default().to_string());
        }
    };

    let details = checkout.form().payment.clone();
    let mut simulator = PaymentSimulator::new(draft, details).map_err(|error| error.to_string())?;

    let outcome = context
        .gateway
        .run(&mut simulator, |stage| println!("{stage}"))
        .await
        .map_err(|error| error.to_string())?;

    let record = match outcome {
        GatewayOutcome::Settled(Settlement::Approved(record)) => record,
        GatewayOutcome::Settled(Settlement::Declined) | GatewayOutcome::Invalid { .. } => {
            checkout.resume();

            return Err(simulator.error().unwrap_or_default().to_string());
        }
    };

    let success = context
        .storefront
        .complete_order(simulator.draft().clone(), record, Timestamp::now())
        .map_err(|error| error.to_string())?;

    println!("Payment successful");
    println!("order:  {}", success.order_id);
    println!("total:  {}", format_amount(success.total));
    println!("method: {}", success.method);

    Ok(())
}
