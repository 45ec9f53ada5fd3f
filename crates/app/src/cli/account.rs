use std::{fs, path::PathBuf};

use clap::Args;
use elancart::{
    address::Address,
    identity::{AuthMode, Credentials, UserUpdate},
    pricing::format_amount,
    validation::is_valid_phone,
};
use elancart_app::context::AppContext;

use super::render;

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Email address
    #[arg(long)]
    email: String,

    /// Password, at least 6 characters
    #[arg(long, env = "ELANCART_PASSWORD", hide_env_values = true)]
    password: String,

    /// Display name, required with --signup
    #[arg(long, default_value = "")]
    name: String,

    /// Create a new account
    #[arg(long)]
    signup: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ProfileArgs {
    /// New display name
    #[arg(long)]
    name: Option<String>,

    /// JSON file with the new shipping address
    #[arg(long)]
    address_file: Option<PathBuf>,

    /// New 10-digit phone number
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct LocaleArgs {
    /// Language code
    #[arg(long)]
    lang: Option<String>,

    /// Display currency code
    #[arg(long)]
    currency: Option<String>,
}

pub(crate) fn login(context: &mut AppContext, args: &LoginArgs) -> Result<(), String> {
    let credentials = Credentials {
        email: args.email.clone(),
        password: args.password.clone(),
        name: args.name.clone(),
    };
    let mode = if args.signup {
        AuthMode::Signup
    } else {
        AuthMode::Login
    };

    let next = context
        .storefront
        .login(&credentials, mode, None)
        .map_err(|error| error.to_string())?;

    println!("logged in as {}; continue at {next}", credentials.email.trim());

    Ok(())
}

pub(crate) fn profile(context: &mut AppContext, args: ProfileArgs) -> Result<(), String> {
    let identity = context.storefront.identity_mut();

    if !identity.is_authenticated() {
        return Err("not logged in".to_string());
    }

    if let Some(path) = &args.address_file {
        let raw = fs::read_to_string(path)
            .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
        let address: Address = serde_json::from_str(&raw)
            .map_err(|error| format!("invalid address file: {error}"))?;

        identity
            .update_address(&address, args.phone.as_deref())
            .map_err(|error| error.to_string())?;
    } else if let Some(phone) = &args.phone
        && !is_valid_phone(phone)
    {
        return Err("Enter a valid 10-digit phone.".to_string());
    }

    let phone = args.phone.filter(|_| args.address_file.is_none());

    if args.name.is_some() || phone.is_some() {
        identity
            .update_user(UserUpdate {
                name: args.name,
                phone,
                ..UserUpdate::default()
            })
            .map_err(|error| error.to_string())?;
    }

    if let Some(user) = identity.current() {
        println!("name:    {}", user.name);
        println!("email:   {}", user.email);
        println!("phone:   {}", user.phone);
        println!("address: {}", user.address);
        println!("orders:  {}", user.orders.len());
    }

    Ok(())
}

pub(crate) fn locale(context: &mut AppContext, args: LocaleArgs) -> Result<(), String> {
    let locale = context.storefront.locale_mut();

    if let Some(lang) = args.lang {
        locale.set_lang(lang);
    }

    if let Some(currency) = args.currency {
        locale.set_currency(currency);
    }

    let preference = locale.preference();
    println!("lang: {}, currency: {}", preference.lang, preference.currency);

    Ok(())
}

pub(crate) fn orders(context: &AppContext) -> Result<(), String> {
    let user = context
        .storefront
        .identity()
        .current()
        .ok_or_else(|| "not logged in".to_string())?;

    if user.orders.is_empty() {
        println!("no orders yet");
        return Ok(());
    }

    let rows = user.orders.iter().rev().map(|order| {
        [
            order.id.to_string(),
            order.placed_at.strftime("%Y-%m-%d %H:%M").to_string(),
            order
                .items
                .iter()
                .map(|line| line.quantity)
                .sum::<u32>()
                .to_string(),
            order
                .payment_method()
                .map_or_else(|| "-".to_string(), |method| method.to_string()),
            order
                .payment
                .as_ref()
                .map_or_else(|| "-".to_string(), |payment| payment.status().to_string()),
            format_amount(order.amounts.total),
        ]
    });

    println!(
        "{}",
        render::table(
            ["Order", "Placed", "Items", "Method", "Payment", "Total"],
            rows,
            5..6
        )
    );

    Ok(())
}
