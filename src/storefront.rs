//! Storefront
//!
//! Composition root for one shopper session. The storefront owns every persisted store and
//! applies the cross-store rules: logout purges the cart, favourites and any pending buy-now
//! intent; checkout is gated on login; and placing an order records it on the user before
//! clearing exactly one item source.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    buy_now::{BuyNowError, BuyNowIntent, BuyNowSlot},
    cart::CartStore,
    checkout::{Checkout, CheckoutEntry, CheckoutError, resolve_items},
    favourites::FavouritesStore,
    identity::{AuthMode, Credentials, IdentityError, IdentityStore},
    locale::LocaleStore,
    orders::{Order, OrderDraft, OrderId, OrderSource, PaymentRecord},
    payment::PaymentError,
    pricing::PaymentMethod,
    products::Product,
    routes::{Access, Route, after_login, guard},
    storage::Storage,
};

/// Errors raised by storefront operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorefrontError {
    /// Identity error
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Checkout error
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Payment error
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Buy-now error
    #[error(transparent)]
    BuyNow(#[from] BuyNowError),

    /// The page needs a logged-in user.
    #[error("login required to visit {from}")]
    LoginRequired {
        /// Page to return to after login
        from: Route,
    },
}

/// Data shown on the order confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSuccess {
    /// Placed order
    pub order_id: OrderId,

    /// Rounded order total
    pub total: Decimal,

    /// Payment method used
    pub method: PaymentMethod,
}

/// Storefront
#[derive(Debug)]
pub struct Storefront {
    cart: CartStore,
    favourites: FavouritesStore,
    identity: IdentityStore,
    buy_now: BuyNowSlot,
    locale: LocaleStore,
}

impl Storefront {
    /// Restore every store from `storage`.
    pub fn restore(storage: &Arc<dyn Storage>) -> Self {
        Self {
            cart: CartStore::restore(Arc::clone(storage)),
            favourites: FavouritesStore::restore(Arc::clone(storage)),
            identity: IdentityStore::restore(Arc::clone(storage)),
            buy_now: BuyNowSlot::restore(Arc::clone(storage)),
            locale: LocaleStore::restore(Arc::clone(storage)),
        }
    }

    /// Cart.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Editable cart.
    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// Favourites.
    pub fn favourites(&self) -> &FavouritesStore {
        &self.favourites
    }

    /// Editable favourites.
    pub fn favourites_mut(&mut self) -> &mut FavouritesStore {
        &mut self.favourites
    }

    /// Identity.
    pub fn identity(&self) -> &IdentityStore {
        &self.identity
    }

    /// Editable identity.
    pub fn identity_mut(&mut self) -> &mut IdentityStore {
        &mut self.identity
    }

    /// Buy-now slot.
    pub fn buy_now_slot(&mut self) -> &mut BuyNowSlot {
        &mut self.buy_now
    }

    /// Locale preference.
    pub fn locale(&self) -> &LocaleStore {
        &self.locale
    }

    /// Editable locale preference.
    pub fn locale_mut(&mut self) -> &mut LocaleStore {
        &mut self.locale
    }

    /// Gate a page visit on the current login state.
    pub fn visit(&self, route: &Route) -> Access {
        guard(route, self.identity.is_authenticated())
    }

    /// Log in from the login page and return the page to continue on.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Identity`] when the credentials are rejected.
    pub fn login(
        &mut self,
        credentials: &Credentials,
        mode: AuthMode,
        from: Option<Route>,
    ) -> Result<Route, StorefrontError> {
        self.identity.authenticate(credentials, mode)?;

        Ok(after_login(from))
    }

    /// Log out and purge everything tied to the session.
    pub fn logout(&mut self) {
        let _logged_out = self.identity.logout();

        self.cart.purge();
        self.favourites.purge();
        self.buy_now.discard();

        debug!("session purged");
    }

    /// Select `quantity` units of `product` for immediate purchase. The cart is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::BuyNow`] when the intent cannot be stashed.
    pub fn buy_now(
        &mut self,
        product: Product,
        quantity: u32,
        now: Timestamp,
    ) -> Result<BuyNowIntent, StorefrontError> {
        let product_id = product.id.clone();
        let intent = BuyNowIntent::single(product, quantity, now);

        self.buy_now.stash(intent.clone())?;

        info!(product = %product_id, quantity = quantity.max(1), "buy now");

        Ok(intent)
    }

    /// Open the checkout page.
    ///
    /// A logged-out visitor is sent to login; an intent carried by the navigation is stashed
    /// first so it survives the redirect. A logged-in user gets a form prefilled from their
    /// profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::LoginRequired`] for a logged-out visitor and
    /// [`StorefrontError::Checkout`] when there is nothing to check out.
    pub fn begin_checkout(
        &mut self,
        entry: CheckoutEntry,
        now: Timestamp,
    ) -> Result<Checkout, StorefrontError> {
        if let Access::RedirectToLogin { from } = self.visit(&Route::Checkout) {
            if let Some(intent) = entry.buy_now
                && intent.is_usable(now)
                && let Err(error) = self.buy_now.stash(intent)
            {
                debug!(%error, "buy-now intent not kept across login");
            }

            return Err(StorefrontError::LoginRequired { from });
        }

        let items = resolve_items(entry, &self.cart, &mut self.buy_now, now)?;
        let mut checkout = Checkout::new(items)?;

        if let Some(user) = self.identity.current() {
            checkout.form_mut().prefill(user);
        }

        Ok(checkout)
    }

    /// Record an approved payment as an order.
    ///
    /// The order is appended to the user's history, then the cart is cleared for cart orders
    /// or the buy-now intent is consumed for buy-now orders.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Identity`] when no user is logged in; nothing is cleared.
    pub fn complete_order(
        &mut self,
        draft: OrderDraft,
        payment: PaymentRecord,
        now: Timestamp,
    ) -> Result<PaymentSuccess, StorefrontError> {
        let source = draft.source;
        let method = payment.method();
        let order = Order::place(draft, payment, now);

        let success = PaymentSuccess {
            order_id: order.id,
            total: order.amounts.total,
            method,
        };

        self.identity.append_order(order)?;

        match source {
            OrderSource::Cart => {
                self.cart.clear_cart();
            }
            OrderSource::BuyNow { created_at } => self.buy_now.consume(created_at),
        }

        info!(order = %success.order_id, total = %success.total, method = %success.method, "order placed");

        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::{
        checkout::{PaymentDetails, SubmitOutcome},
        identity::UserRecord,
        orders::{BillingSnapshot, COD_NOTE, Contact, PaymentStatus, ShippingSnapshot},
        storage::{MemoryStorage, StorageExt, keys},
    };

    use super::*;

    fn now() -> Result<Timestamp, jiff::Error> {
        "2026-05-10T09:00:00Z".parse()
    }

    fn lamp() -> Product {
        Product::new("dj-1", "Lamp", Decimal::from(20))
    }

    fn storefront() -> (Arc<dyn Storage>, Storefront) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let storefront = Storefront::restore(&storage);

        (storage, storefront)
    }

    fn cod() -> PaymentRecord {
        PaymentRecord::Cod {
            status: PaymentStatus::Pending,
            note: COD_NOTE.to_string(),
        }
    }

    #[test]
    fn logout_purges_session_state() -> TestResult {
        let (storage, mut storefront) = storefront();
        storefront.identity_mut().login(UserRecord::new("a@b.co", "A"));
        storefront.cart_mut().add_to_cart(&lamp(), 2);
        storefront.favourites_mut().add_to_favourites(&lamp());
        storefront.buy_now(lamp(), 1, now()?)?;

        storefront.logout();

        assert!(storefront.cart().is_empty());
        assert_eq!(storefront.favourites().count(), 0);
        assert!(storefront.buy_now_slot().current(now()?).is_none());
        assert_eq!(storage.get(keys::CART)?, None);
        assert_eq!(storage.get(keys::FAVOURITES)?, None);
        assert_eq!(storage.get(keys::USER)?, None);

        Ok(())
    }

    #[test]
    fn logged_out_checkout_keeps_buy_now_intent() -> TestResult {
        let (_, mut storefront) = storefront();
        let intent = BuyNowIntent::single(lamp(), 2, now()?);

        let result = storefront.begin_checkout(CheckoutEntry::buy_now(intent.clone()), now()?);

        assert_eq!(
            result.err(),
            Some(StorefrontError::LoginRequired {
                from: Route::Checkout
            })
        );

        let credentials = Credentials {
            email: "asha@example.in".to_string(),
            password: "secret1".to_string(),
            name: String::new(),
        };
        let next = storefront.login(&credentials, AuthMode::Login, Some(Route::Checkout))?;
        assert_eq!(next, Route::Checkout);

        let later = now()?.checked_add(SignedDuration::from_mins(5))?;
        let checkout = storefront.begin_checkout(CheckoutEntry::default(), later)?;

        assert_eq!(checkout.items().source, intent.source());
        assert_eq!(checkout.items().lines, intent.items);
        assert_eq!(checkout.form().contact.email, "asha@example.in");

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_be_checked_out() -> TestResult {
        let (_, mut storefront) = storefront();
        storefront.identity_mut().login(UserRecord::new("a@b.co", "A"));

        assert_eq!(
            storefront
                .begin_checkout(CheckoutEntry::from_cart(), now()?)
                .err(),
            Some(StorefrontError::Checkout(CheckoutError::NoItems))
        );

        Ok(())
    }

    #[test]
    fn completing_cart_order_clears_cart_once() -> TestResult {
        let (_, mut storefront) = storefront();
        storefront.identity_mut().login(UserRecord {
            phone: "9876543210".to_string(),
            address: "12 MG Road, Flat 4, Bengaluru, Karnataka 560001, India".to_string(),
            ..UserRecord::new("asha@example.in", "Asha")
        });
        storefront.cart_mut().add_to_cart(&lamp(), 1);

        let mut checkout = storefront.begin_checkout(CheckoutEntry::from_cart(), now()?)?;
        checkout.form_mut().payment = PaymentDetails::Cod;
        checkout.form_mut().terms_accepted = true;

        let SubmitOutcome::Ready(draft) = checkout.submit()? else {
            panic!("expected a ready draft");
        };

        let success = storefront.complete_order(*draft, cod(), now()?)?;

        // 20 * 83 = 1660, + 199 shipping + 49 cod + 132.80 tax
        assert_eq!(success.total, Decimal::new(204_080, 2));
        assert_eq!(success.method, PaymentMethod::Cod);
        assert!(storefront.cart().is_empty());

        let orders = storefront
            .identity()
            .current()
            .map(|user| user.orders.len());
        assert_eq!(orders, Some(1));

        Ok(())
    }

    #[test]
    fn completing_requires_login_and_leaves_cart() -> TestResult {
        let (_, mut storefront) = storefront();
        storefront.identity_mut().login(UserRecord::new("a@b.co", "A"));
        storefront.cart_mut().add_to_cart(&lamp(), 1);
        let checkout = storefront.begin_checkout(CheckoutEntry::from_cart(), now()?)?;
        let draft = OrderDraft {
            items: checkout.items().lines.clone(),
            amounts: checkout.amounts(),
            contact: Contact::default(),
            shipping: ShippingSnapshot::from(&checkout.form().shipping),
            billing: BillingSnapshot::new(&checkout.form().shipping, None),
            delivery_method: checkout.form().delivery,
            payment_method: PaymentMethod::Cod,
            source: OrderSource::Cart,
        };

        storefront.logout();
        storefront.cart_mut().add_to_cart(&lamp(), 1);

        assert_eq!(
            storefront.complete_order(draft, cod(), now()?).err(),
            Some(StorefrontError::Identity(IdentityError::NotLoggedIn))
        );
        assert!(!storefront.cart().is_empty());

        Ok(())
    }
}
