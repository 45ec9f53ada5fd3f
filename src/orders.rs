//! Orders

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    cart::CartLine,
    pricing::{DeliveryMethod, OrderAmounts, PaymentMethod},
};

/// Order identifier, derived from the placement time in milliseconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Identifier for an order placed at `at`.
    pub fn from_timestamp(at: Timestamp) -> Self {
        Self(at.as_millisecond())
    }

    /// Raw identifier.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Order status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Payment approved and order accepted
    #[default]
    Confirmed,
}

/// Payment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Funds captured
    Completed,

    /// Collected on delivery, or not known to be captured
    #[default]
    Pending,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
        })
    }
}

/// Note attached to cash-on-delivery payments.
pub const COD_NOTE: &str = "Payment to be collected on delivery";

/// Payment result stored on an order. Never carries full card numbers or security codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentRecord {
    /// Card payment
    Card {
        /// Last four digits of the card number
        #[serde(default)]
        last4: String,

        /// Name on the card
        #[serde(default, rename = "cardHolder")]
        card_holder: String,

        /// Payment status
        #[serde(default)]
        status: PaymentStatus,
    },

    /// UPI payment
    Upi {
        /// UPI handle
        #[serde(default, rename = "upiId")]
        upi_id: String,

        /// Payment status
        #[serde(default)]
        status: PaymentStatus,
    },

    /// Cash on delivery
    Cod {
        /// Payment status
        #[serde(default)]
        status: PaymentStatus,

        /// Collection note
        #[serde(default)]
        note: String,
    },
}

impl PaymentRecord {
    /// Payment method of this record.
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Card { .. } => PaymentMethod::Card,
            Self::Upi { .. } => PaymentMethod::Upi,
            Self::Cod { .. } => PaymentMethod::Cod,
        }
    }

    /// Payment status of this record.
    pub fn status(&self) -> PaymentStatus {
        match self {
            Self::Card { status, .. } | Self::Upi { status, .. } | Self::Cod { status, .. } => {
                *status
            }
        }
    }
}

/// Buyer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Full name
    #[serde(default)]
    pub full_name: String,

    /// Email address
    #[serde(default)]
    pub email: String,

    /// 10-digit phone number
    #[serde(default)]
    pub phone: String,
}

/// Shipping address snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSnapshot {
    /// Structured address
    #[serde(flatten)]
    pub address: Address,

    /// Single-line form
    #[serde(default)]
    pub address_formatted: String,
}

impl From<&Address> for ShippingSnapshot {
    fn from(address: &Address) -> Self {
        Self {
            address: address.clone(),
            address_formatted: address.formatted(),
        }
    }
}

/// Billing address snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSnapshot {
    /// Whether billing reuses the shipping address
    #[serde(default)]
    pub same_as_shipping: bool,

    /// Structured address
    #[serde(flatten)]
    pub address: Address,

    /// Single-line form
    #[serde(default)]
    pub address_formatted: String,
}

impl BillingSnapshot {
    /// Snapshot billing as given, or the shipping address when `billing` is `None`.
    pub fn new(shipping: &Address, billing: Option<&Address>) -> Self {
        let address = billing.unwrap_or(shipping);

        Self {
            same_as_shipping: billing.is_none(),
            address: address.clone(),
            address_formatted: address.formatted(),
        }
    }
}

/// Origin of the items in an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderSource {
    /// The cart; cleared once the order is placed
    #[default]
    Cart,

    /// A buy-now intent, identified by its creation time; the cart is left alone
    #[serde(rename_all = "camelCase")]
    BuyNow {
        /// Creation time of the intent
        created_at: Timestamp,
    },
}

/// A validated order awaiting payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Lines being purchased
    pub items: Vec<CartLine>,

    /// Amounts at full precision
    pub amounts: OrderAmounts,

    /// Buyer contact
    pub contact: Contact,

    /// Shipping address
    pub shipping: ShippingSnapshot,

    /// Billing address
    pub billing: BillingSnapshot,

    /// Delivery method
    pub delivery_method: DeliveryMethod,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Where the items came from
    #[serde(default)]
    pub source: OrderSource,
}

/// A placed order. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    #[serde(default)]
    pub id: OrderId,

    /// Purchased lines
    #[serde(default)]
    pub items: Vec<CartLine>,

    /// Amounts, rounded to 2 decimal places
    #[serde(default)]
    pub amounts: OrderAmounts,

    /// Buyer contact
    #[serde(default)]
    pub contact: Contact,

    /// Shipping address
    #[serde(default)]
    pub shipping: ShippingSnapshot,

    /// Billing address
    #[serde(default)]
    pub billing: BillingSnapshot,

    /// Delivery method
    #[serde(default)]
    pub delivery_method: DeliveryMethod,

    /// Payment result; absent only in damaged records
    #[serde(default)]
    pub payment: Option<PaymentRecord>,

    /// Order status
    #[serde(default)]
    pub status: OrderStatus,

    /// Placement time
    #[serde(default)]
    pub placed_at: Timestamp,
}

impl Order {
    /// Complete `draft` with its payment result. Amounts are rounded here, once.
    pub fn place(draft: OrderDraft, payment: PaymentRecord, placed_at: Timestamp) -> Self {
        Self {
            id: OrderId::from_timestamp(placed_at),
            items: draft.items,
            amounts: draft.amounts.rounded(),
            contact: draft.contact,
            shipping: draft.shipping,
            billing: draft.billing,
            delivery_method: draft.delivery_method,
            payment: Some(payment),
            status: OrderStatus::Confirmed,
            placed_at,
        }
    }

    /// Payment method used, when the payment result is known.
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment.as_ref().map(PaymentRecord::method)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{pricing::amounts_for, products::Product};

    use super::*;

    fn draft() -> OrderDraft {
        let items = vec![CartLine::new(
            Product::new("dj-1", "Lamp", Decimal::new(1999, 2)),
            1,
        )];
        let shipping = Address::parse("12 MG Road, Flat 4, Bengaluru, Karnataka 560001, India");

        OrderDraft {
            amounts: amounts_for(&items, DeliveryMethod::Standard, PaymentMethod::Cod),
            items,
            contact: Contact::default(),
            shipping: ShippingSnapshot::from(&shipping),
            billing: BillingSnapshot::new(&shipping, None),
            delivery_method: DeliveryMethod::Standard,
            payment_method: PaymentMethod::Cod,
            source: OrderSource::Cart,
        }
    }

    #[test]
    fn placing_rounds_amounts_and_derives_id() -> TestResult {
        let placed_at: Timestamp = "2026-03-01T10:00:00Z".parse()?;
        let payment = PaymentRecord::Cod {
            status: PaymentStatus::Pending,
            note: COD_NOTE.to_string(),
        };

        let order = Order::place(draft(), payment, placed_at);

        assert_eq!(order.id.get(), placed_at.as_millisecond());
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.amounts.subtotal, Decimal::new(165_917, 2));
        assert_eq!(order.payment_method(), Some(PaymentMethod::Cod));

        Ok(())
    }

    #[test]
    fn order_missing_fields_deserializes_with_defaults() -> TestResult {
        let order: Order = serde_json::from_str(
            r#"{"id":1772359200000,"items":[],"payment":{"method":"upi","upiId":"asha@okbank"}}"#,
        )?;

        assert_eq!(order.id.get(), 1_772_359_200_000);
        assert_eq!(order.shipping, ShippingSnapshot::default());
        assert!(!order.billing.same_as_shipping);
        assert_eq!(order.placed_at, Timestamp::UNIX_EPOCH);
        assert_eq!(order.payment_method(), Some(PaymentMethod::Upi));
        assert_eq!(
            order.payment.as_ref().map(PaymentRecord::status),
            Some(PaymentStatus::Pending)
        );

        let bare: Order = serde_json::from_str("{}")?;

        assert_eq!(bare.payment_method(), None);
        assert_eq!(bare.status, OrderStatus::Confirmed);

        Ok(())
    }

    #[test]
    fn billing_defaults_to_shipping() {
        let draft = draft();

        assert!(draft.billing.same_as_shipping);
        assert_eq!(
            draft.billing.address_formatted,
            draft.shipping.address_formatted
        );
    }

    #[test]
    fn card_record_serializes_without_sensitive_fields() -> TestResult {
        let record = PaymentRecord::Card {
            last4: "4242".to_string(),
            card_holder: "Asha K".to_string(),
            status: PaymentStatus::Completed,
        };

        let json = serde_json::to_value(&record)?;

        assert_eq!(json["method"], "card");
        assert_eq!(json["last4"], "4242");
        assert_eq!(json["cardHolder"], "Asha K");
        assert_eq!(json["status"], "completed");
        assert!(json.get("cvv").is_none());

        Ok(())
    }
}
