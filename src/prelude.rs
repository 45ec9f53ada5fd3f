//! ElanCart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    address::{Address, AddressField},
    buy_now::{BUY_NOW_TTL, BuyNowError, BuyNowIntent, BuyNowSlot},
    cart::{CartLine, CartState, CartStore},
    catalog::{CatalogFilters, CatalogStatus, CatalogView, PAGE_SIZE, Page, SortOrder},
    checkout::{
        CardDetails, Checkout, CheckoutEntry, CheckoutError, CheckoutForm, CheckoutPhase,
        FieldErrors, FieldKey, Focus, PaymentDetails, SubmitOutcome, UpiDetails,
    },
    favourites::{FavouritesState, FavouritesStore},
    identity::{AuthMode, Credentials, IdentityError, IdentityStore, UserRecord, UserUpdate},
    locale::{LocalePreference, LocaleStore},
    orders::{Contact, Order, OrderDraft, OrderId, OrderSource, PaymentRecord, PaymentStatus},
    payment::{PaymentError, PaymentPhase, PaymentSimulator, Settlement, Submission},
    pricing::{DeliveryMethod, OrderAmounts, PaymentMethod, format_amount},
    products::{Product, ProductId},
    routes::{Access, Route},
    storage::{MemoryStorage, Storage, StorageError, StorageExt},
    storefront::{PaymentSuccess, Storefront, StorefrontError},
};
