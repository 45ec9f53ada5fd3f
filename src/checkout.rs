//! Checkout
//!
//! A checkout collects contact, shipping, billing and payment details for a fixed selection of
//! items. Submitting runs every field check at once; the first failing field in
//! [`FieldKey`] order receives focus. Once the fields pass, the terms must be accepted before an
//! [`OrderDraft`] is handed to the payment simulator. A checkout never touches the cart or the
//! user record.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    address::{Address, AddressField},
    buy_now::{BuyNowIntent, BuyNowSlot},
    cart::{CartLine, CartStore},
    identity::UserRecord,
    orders::{BillingSnapshot, Contact, OrderDraft, OrderSource, ShippingSnapshot},
    pricing::{DeliveryMethod, OrderAmounts, PaymentMethod, amounts_for},
    validation::{
        is_present, is_valid_card_number, is_valid_cvv, is_valid_email, is_valid_expiry,
        is_valid_phone, is_valid_upi_id, strip_whitespace,
    },
};

/// Shown above the form when any field fails.
pub const CORRECT_FIELDS_MESSAGE: &str = "Please correct the highlighted fields.";

/// Shown when the terms have not been accepted.
pub const ACCEPT_TERMS_MESSAGE: &str = "Please agree to the terms and conditions.";

/// Errors raised by the checkout flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Neither the cart nor a buy-now intent has items.
    #[error("there is nothing to check out")]
    NoItems,

    /// The checkout was already handed to payment.
    #[error("checkout was already submitted for payment")]
    AlreadySubmitted,
}

/// Validated form fields, declared in focus priority order: contact, shipping, payment, billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    /// Contact full name
    FullName,
    /// Contact email
    Email,
    /// Contact phone
    Phone,
    /// Shipping line 1
    Address1,
    /// Shipping postal code
    PostalCode,
    /// Shipping city
    City,
    /// Shipping state
    State,
    /// Name on card
    NameOnCard,
    /// Card number
    CardNumber,
    /// Card expiry
    Expiry,
    /// Card security code
    Cvv,
    /// UPI handle
    UpiId,
    /// Billing line 1
    BillingAddress1,
    /// Billing postal code
    BillingPostalCode,
    /// Billing city
    BillingCity,
    /// Billing state
    BillingState,
}

impl FieldKey {
    /// Form control identifier, e.g. `billingPostalCode`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address1 => "address1",
            Self::PostalCode => "postalCode",
            Self::City => "city",
            Self::State => "state",
            Self::NameOnCard => "nameOnCard",
            Self::CardNumber => "cardNumber",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
            Self::UpiId => "upiId",
            Self::BillingAddress1 => "billingAddress1",
            Self::BillingPostalCode => "billingPostalCode",
            Self::BillingCity => "billingCity",
            Self::BillingState => "billingState",
        }
    }

    fn shipping(field: AddressField) -> Self {
        match field {
            AddressField::Address1 => Self::Address1,
            AddressField::PostalCode => Self::PostalCode,
            AddressField::City => Self::City,
            AddressField::State => Self::State,
        }
    }

    fn billing(field: AddressField) -> Self {
        match field {
            AddressField::Address1 => Self::BillingAddress1,
            AddressField::PostalCode => Self::BillingPostalCode,
            AddressField::City => Self::BillingCity,
            AddressField::State => Self::BillingState,
        }
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Field-scoped validation messages, ordered by focus priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldKey, &'static str>);

impl FieldErrors {
    /// Whether every field passed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message for `key`, if it failed.
    pub fn get(&self, key: FieldKey) -> Option<&'static str> {
        self.0.get(&key).copied()
    }

    /// Highest-priority failing field.
    pub fn first(&self) -> Option<FieldKey> {
        self.0.keys().next().copied()
    }

    /// Failing fields and messages in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &'static str)> + '_ {
        self.0.iter().map(|(key, message)| (*key, *message))
    }

    fn insert(&mut self, key: FieldKey, message: &'static str) {
        self.0.insert(key, message);
    }

    fn check(&mut self, key: FieldKey, valid: bool, message: &'static str) {
        if !valid {
            self.insert(key, message);
        }
    }

    fn set(&mut self, key: FieldKey, message: Option<&'static str>) {
        match message {
            Some(message) => self.insert(key, message),
            None => {
                self.0.remove(&key);
            }
        }
    }
}

/// Card input. Only the last four digits and the holder name outlive the payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    /// Name on the card
    #[serde(default)]
    pub name: String,

    /// Card number, spaces allowed
    #[serde(default)]
    pub number: String,

    /// Expiry as `MM/YY`
    #[serde(default)]
    pub expiry: String,

    /// Security code
    #[serde(default)]
    pub cvv: String,
}

impl CardDetails {
    /// Card number without whitespace.
    pub fn digits(&self) -> String {
        strip_whitespace(&self.number)
    }

    /// Last four digits of the card number.
    pub fn last4(&self) -> String {
        let digits = self.digits();
        let skip = digits.chars().count().saturating_sub(4);

        digits.chars().skip(skip).collect()
    }
}

/// UPI input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiDetails {
    /// UPI handle, e.g. `name@bank`
    #[serde(default)]
    pub id: String,
}

/// Payment input for the chosen method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentDetails {
    /// Card payment
    Card(CardDetails),

    /// UPI payment
    Upi(UpiDetails),

    /// Cash on delivery
    Cod,
}

impl Default for PaymentDetails {
    fn default() -> Self {
        Self::Card(CardDetails::default())
    }
}

impl PaymentDetails {
    /// Payment method of these details.
    pub fn method(&self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::Card,
            Self::Upi(_) => PaymentMethod::Upi,
            Self::Cod => PaymentMethod::Cod,
        }
    }

    /// Method-specific field errors. Cash on delivery has no fields.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        match self {
            Self::Card(card) => {
                errors.check(
                    FieldKey::CardNumber,
                    is_valid_card_number(&card.number),
                    "Enter a valid 16-digit card number.",
                );
                errors.check(
                    FieldKey::Expiry,
                    is_valid_expiry(&card.expiry),
                    "Expiry must be MM/YY.",
                );
                errors.check(
                    FieldKey::Cvv,
                    is_valid_cvv(&card.cvv),
                    "CVV must be 3 or 4 digits.",
                );
                errors.check(
                    FieldKey::NameOnCard,
                    is_present(&card.name),
                    "Name on card required.",
                );
            }
            Self::Upi(upi) => {
                errors.check(
                    FieldKey::UpiId,
                    is_valid_upi_id(&upi.id),
                    "Enter a valid UPI ID.",
                );
            }
            Self::Cod => {}
        }

        errors
    }
}

/// Checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    /// Buyer contact
    #[serde(default)]
    pub contact: Contact,

    /// Shipping address
    #[serde(default)]
    pub shipping: Address,

    /// Separate billing address; `None` bills the shipping address
    #[serde(default)]
    pub billing: Option<Address>,

    /// Delivery method
    #[serde(default)]
    pub delivery: DeliveryMethod,

    /// Payment method and its details
    #[serde(default)]
    pub payment: PaymentDetails,

    /// Whether the terms and conditions were accepted
    #[serde(default)]
    pub terms_accepted: bool,
}

impl CheckoutForm {
    /// Every failing field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = self.payment.validate();

        errors.check(
            FieldKey::FullName,
            is_present(&self.contact.full_name),
            "Full name is required.",
        );
        errors.check(
            FieldKey::Email,
            is_valid_email(&self.contact.email),
            "Enter a valid email.",
        );
        errors.check(
            FieldKey::Phone,
            is_valid_phone(&self.contact.phone),
            "Enter a valid 10-digit phone.",
        );

        for (field, message) in self.shipping.violations() {
            errors.insert(FieldKey::shipping(field), message);
        }

        if let Some(billing) = &self.billing {
            for (field, message) in billing.violations() {
                errors.insert(FieldKey::billing(field), message);
            }
        }

        errors
    }

    /// The message for a single field, as shown when it loses focus.
    pub fn field_error(&self, key: FieldKey) -> Option<&'static str> {
        self.validate().get(key)
    }

    /// Fill blank contact and shipping fields from the user's profile. Fields the buyer has
    /// already typed are kept.
    pub fn prefill(&mut self, user: &UserRecord) {
        let contact = &mut self.contact;

        for (field, profile) in [
            (&mut contact.full_name, &user.name),
            (&mut contact.email, &user.email),
            (&mut contact.phone, &user.phone),
        ] {
            if field.is_empty() {
                profile.clone_into(field);
            }
        }

        if let Some(address) = user.parsed_address() {
            self.shipping.fill_blanks_from(&address);
        }
    }
}

/// How checkout was entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutEntry {
    /// Entered from the cart page; forces the cart contents
    pub from_cart: bool,

    /// Buy-now intent passed along with the navigation
    pub buy_now: Option<BuyNowIntent>,
}

impl CheckoutEntry {
    /// Entry from the cart page.
    pub fn from_cart() -> Self {
        Self {
            from_cart: true,
            buy_now: None,
        }
    }

    /// Entry carrying a buy-now intent.
    pub fn buy_now(intent: BuyNowIntent) -> Self {
        Self {
            from_cart: false,
            buy_now: Some(intent),
        }
    }
}

/// Items a checkout will purchase and where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutItems {
    /// Selected lines
    pub lines: Vec<CartLine>,

    /// Item origin
    pub source: OrderSource,
}

/// Decide which items to check out.
///
/// In order: an explicit cart entry takes the cart and discards any pending intent; then an
/// intent carried by the navigation; then the intent waiting in `slot`; then the cart.
///
/// # Errors
///
/// Returns [`CheckoutError::NoItems`] when the chosen source is empty.
pub fn resolve_items(
    entry: CheckoutEntry,
    cart: &CartStore,
    slot: &mut BuyNowSlot,
    now: Timestamp,
) -> Result<CheckoutItems, CheckoutError> {
    let from_cart = || CheckoutItems {
        lines: cart.lines().to_vec(),
        source: OrderSource::Cart,
    };

    let items = if entry.from_cart {
        slot.discard();

        from_cart()
    } else if let Some(intent) = entry
        .buy_now
        .filter(|intent| intent.is_usable(now) && !slot.is_replay(intent))
    {
        from_intent(intent)
    } else if let Some(intent) = slot.current(now) {
        from_intent(intent.clone())
    } else {
        from_cart()
    };

    if items.lines.is_empty() {
        return Err(CheckoutError::NoItems);
    }

    debug!(lines = items.lines.len(), source = ?items.source, "checkout items resolved");

    Ok(items)
}

fn from_intent(intent: BuyNowIntent) -> CheckoutItems {
    CheckoutItems {
        source: intent.source(),
        lines: intent.items,
    }
}

/// Checkout phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// Form is editable
    #[default]
    Collecting,

    /// A draft was handed to payment
    SubmittingPayment,
}

/// Where focus goes after a blocked submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// A form field
    Field(FieldKey),

    /// The terms acceptance control
    Terms,
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Fields failed validation
    Invalid {
        /// First failing field
        focus: FieldKey,
    },

    /// Fields passed but the terms were not accepted
    TermsRequired,

    /// Both gates passed
    Ready(Box<OrderDraft>),
}

impl SubmitOutcome {
    /// Where focus should go, if the submit was blocked.
    pub fn focus(&self) -> Option<Focus> {
        match self {
            Self::Invalid { focus } => Some(Focus::Field(*focus)),
            Self::TermsRequired => Some(Focus::Terms),
            Self::Ready(_) => None,
        }
    }
}

/// Checkout Flow
#[derive(Debug, Clone)]
pub struct Checkout {
    items: CheckoutItems,
    form: CheckoutForm,
    phase: CheckoutPhase,
    errors: FieldErrors,
    message: Option<&'static str>,
}

impl Checkout {
    /// Start a checkout for `items`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NoItems`] when `items` is empty.
    pub fn new(items: CheckoutItems) -> Result<Self, CheckoutError> {
        if items.lines.is_empty() {
            return Err(CheckoutError::NoItems);
        }

        Ok(Self {
            items,
            form: CheckoutForm::default(),
            phase: CheckoutPhase::Collecting,
            errors: FieldErrors::default(),
            message: None,
        })
    }

    /// Items being purchased.
    pub fn items(&self) -> &CheckoutItems {
        &self.items
    }

    /// Form input.
    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Editable form input.
    pub fn form_mut(&mut self) -> &mut CheckoutForm {
        &mut self.form
    }

    /// Current phase.
    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Field errors from the last submit or blur check.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Form-level message from the last submit.
    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// Live order summary for the current delivery and payment choice.
    pub fn amounts(&self) -> OrderAmounts {
        amounts_for(
            &self.items.lines,
            self.form.delivery,
            self.form.payment.method(),
        )
    }

    /// Re-check one field, as when it loses focus, and return its message.
    pub fn blur(&mut self, key: FieldKey) -> Option<&'static str> {
        let message = self.form.field_error(key);
        self.errors.set(key, message);

        message
    }

    /// Validate the form, then the terms, and build the order draft.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadySubmitted`] once a draft has been handed to payment.
    pub fn submit(&mut self) -> Result<SubmitOutcome, CheckoutError> {
        if self.phase == CheckoutPhase::SubmittingPayment {
            return Err(CheckoutError::AlreadySubmitted);
        }

        self.errors = self.form.validate();

        if let Some(focus) = self.errors.first() {
            debug!(invalid = self.errors.len(), %focus, "checkout blocked");
            self.message = Some(CORRECT_FIELDS_MESSAGE);

            return Ok(SubmitOutcome::Invalid { focus });
        }

        if !self.form.terms_accepted {
            self.message = Some(ACCEPT_TERMS_MESSAGE);

            return Ok(SubmitOutcome::TermsRequired);
        }

        self.message = None;
        self.phase = CheckoutPhase::SubmittingPayment;

        Ok(SubmitOutcome::Ready(Box::new(self.draft())))
    }

    /// Return to editing, e.g. after a declined payment.
    pub fn resume(&mut self) {
        self.phase = CheckoutPhase::Collecting;
    }

    fn draft(&self) -> OrderDraft {
        let form = &self.form;

        OrderDraft {
            items: self.items.lines.clone(),
            amounts: self.amounts(),
            contact: form.contact.clone(),
            shipping: ShippingSnapshot::from(&form.shipping),
            billing: BillingSnapshot::new(&form.shipping, form.billing.as_ref()),
            delivery_method: form.delivery,
            payment_method: form.payment.method(),
            source: self.items.source,
        }
    }
}
