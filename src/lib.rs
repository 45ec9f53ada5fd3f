//! ElanCart
//!
//! ElanCart is the domain core of a single-page storefront: catalog derivation, cart,
//! favourites, identity, checkout and a simulated payment gateway, all persisted through a
//! small key-value port.

pub mod address;
pub mod buy_now;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod favourites;
pub mod identity;
pub mod locale;
pub mod orders;
pub mod payment;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod routes;
pub mod storage;
pub mod storefront;
pub mod validation;
