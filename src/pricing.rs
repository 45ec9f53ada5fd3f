//! Pricing
//!
//! Order amounts are computed in the display currency (INR). Catalog prices arrive in the source
//! currency (USD) and are converted with a fixed multiplier. The whole chain runs at full
//! precision; only [`OrderAmounts::rounded`] rounds, at the persistence boundary.

use std::fmt::{Display, Formatter, Result as FmtResult};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;

/// Source currency to display currency multiplier.
pub const DISPLAY_CONVERSION_RATE: Decimal = Decimal::from_parts(83, 0, 0, false, 0);

/// Subtotal at or above which standard delivery is free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(4150, 0, 0, false, 0);

/// Standard delivery fee below the free-shipping threshold.
pub const STANDARD_SHIPPING_FEE: Decimal = Decimal::from_parts(199, 0, 0, false, 0);

/// Express delivery fee, charged regardless of subtotal.
pub const EXPRESS_SHIPPING_FEE: Decimal = Decimal::from_parts(499, 0, 0, false, 0);

/// Cash-on-delivery surcharge.
pub const COD_FEE: Decimal = Decimal::from_parts(49, 0, 0, false, 0);

/// Tax rate as a fraction of the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Delivery method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Free above the threshold, otherwise the standard fee
    #[default]
    Standard,

    /// Always the express fee
    Express,
}

/// Payment method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Debit or credit card
    #[default]
    Card,

    /// UPI transfer
    Upi,

    /// Cash on delivery
    Cod,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Card => write!(f, "card"),
            Self::Upi => write!(f, "upi"),
            Self::Cod => write!(f, "cod"),
        }
    }
}

/// Order amounts breakdown in the display currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmounts {
    /// Sum of line totals
    pub subtotal: Decimal,

    /// Delivery fee
    pub shipping: Decimal,

    /// Cash-on-delivery surcharge
    pub cod_fee: Decimal,

    /// Tax on the subtotal
    pub tax: Decimal,

    /// Grand total
    pub total: Decimal,
}

impl OrderAmounts {
    /// Every amount rounded to 2 decimal places. The total is rounded from the full-precision
    /// total, not re-summed from rounded parts.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: self.subtotal.round_dp(2),
            shipping: self.shipping.round_dp(2),
            cod_fee: self.cod_fee.round_dp(2),
            tax: self.tax.round_dp(2),
            total: self.total.round_dp(2),
        }
    }
}

/// Convert a source-currency amount into the display currency.
pub fn to_display(amount: Decimal) -> Decimal {
    amount * DISPLAY_CONVERSION_RATE
}

/// Display-currency subtotal of the given lines, at full precision.
pub fn display_subtotal<'a>(lines: impl IntoIterator<Item = &'a CartLine>) -> Decimal {
    lines
        .into_iter()
        .map(|line| to_display(line.line_total()))
        .sum()
}

/// Delivery fee for a subtotal.
pub fn shipping_fee(subtotal: Decimal, delivery: DeliveryMethod) -> Decimal {
    match delivery {
        DeliveryMethod::Express => EXPRESS_SHIPPING_FEE,
        DeliveryMethod::Standard if subtotal >= FREE_SHIPPING_THRESHOLD => Decimal::ZERO,
        DeliveryMethod::Standard => STANDARD_SHIPPING_FEE,
    }
}

/// Cash-on-delivery surcharge for a payment method.
pub fn cod_fee(payment: PaymentMethod) -> Decimal {
    match payment {
        PaymentMethod::Cod => COD_FEE,
        PaymentMethod::Card | PaymentMethod::Upi => Decimal::ZERO,
    }
}

/// Tax on a subtotal.
pub fn tax(subtotal: Decimal) -> Decimal {
    Percentage::from(TAX_RATE) * subtotal
}

/// Compute the full-precision amounts breakdown for a display-currency subtotal.
pub fn compute_amounts(
    subtotal: Decimal,
    delivery: DeliveryMethod,
    payment: PaymentMethod,
) -> OrderAmounts {
    let shipping = shipping_fee(subtotal, delivery);
    let cod_fee = cod_fee(payment);
    let tax = tax(subtotal);

    OrderAmounts {
        subtotal,
        shipping,
        cod_fee,
        tax,
        total: subtotal + shipping + cod_fee + tax,
    }
}

/// Amounts for a set of lines.
pub fn amounts_for(
    lines: &[CartLine],
    delivery: DeliveryMethod,
    payment: PaymentMethod,
) -> OrderAmounts {
    compute_amounts(display_subtotal(lines), delivery, payment)
}

/// Cart page summary: standard delivery, no surcharge.
pub fn cart_summary(lines: &[CartLine]) -> OrderAmounts {
    amounts_for(lines, DeliveryMethod::Standard, PaymentMethod::Card)
}

/// Format a display-currency amount, e.g. `₹1,328.00`.
pub fn format_amount(amount: Decimal) -> String {
    let minor = (amount.round_dp(2) * Decimal::ONE_HUNDRED)
        .to_i64()
        .unwrap_or_default();

    format!("{}", Money::from_minor(minor, iso::INR))
}
