//! Identity
//!
//! The logged-in user record. There is no real authentication: any well-formed email and
//! password pair logs in.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    address::{Address, AddressField},
    orders::Order,
    storage::{Storage, StorageExt, keys},
    validation::{is_present, is_valid_email, is_valid_password, is_valid_phone},
};

/// Errors raised by the identity store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The email address is malformed.
    #[error("Enter a valid email address.")]
    InvalidEmail,

    /// The password is too short.
    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,

    /// Signup without a name.
    #[error("Name is required for signup.")]
    NameRequired,

    /// The phone number is not 10 digits.
    #[error("Enter a valid 10-digit phone.")]
    InvalidPhone,

    /// The address breaks one or more rules; the first message is shown.
    #[error("{}", .0.first().map_or("Invalid address.", |(_, message)| *message))]
    InvalidAddress(Vec<(AddressField, &'static str)>),

    /// No user is logged in.
    #[error("no user is logged in")]
    NotLoggedIn,
}

/// Logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Email address
    #[serde(default)]
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Formatted shipping address
    #[serde(default)]
    pub address: String,

    /// Phone number
    #[serde(default)]
    pub phone: String,

    /// Placed orders, oldest first
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl UserRecord {
    /// Fresh record with no address, phone or orders.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Structured form of the stored address string.
    pub fn parsed_address(&self) -> Option<Address> {
        is_present(&self.address).then(|| Address::parse(&self.address))
    }
}

/// Login form input.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Email address
    pub email: String,

    /// Password; only its length is checked
    pub password: String,

    /// Display name, required for signup
    pub name: String,
}

/// Login form mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Existing account
    #[default]
    Login,

    /// New account
    Signup,
}

/// Shallow partial update of a [`UserRecord`].
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New display name
    pub name: Option<String>,

    /// New formatted address
    pub address: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// Replacement order list
    pub orders: Option<Vec<Order>>,
}

/// Proof that the identity store has logged out. Hand it to the stores that must be purged.
#[derive(Debug)]
#[must_use = "cart and favourites must be purged after logout"]
pub struct LoggedOut(());

/// Identity Store
pub struct IdentityStore {
    storage: Arc<dyn Storage>,
    user: Option<UserRecord>,
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl IdentityStore {
    /// Restore the user from storage. A malformed blob logs the user out.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let user = storage.restore_or_default(keys::USER);

        Self { storage, user }
    }

    /// Logged-in user, if any.
    pub fn current(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    /// Whether a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Replace the current user with `user`.
    pub fn login(&mut self, user: UserRecord) -> &UserRecord {
        info!(email = %user.email, "user logged in");

        self.storage.persist(keys::USER, &user);

        self.user.insert(user)
    }

    /// Check the login form and log in with a fresh record.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidEmail`], [`IdentityError::PasswordTooShort`] or, when
    /// signing up, [`IdentityError::NameRequired`].
    pub fn authenticate(
        &mut self,
        credentials: &Credentials,
        mode: AuthMode,
    ) -> Result<&UserRecord, IdentityError> {
        if !is_valid_email(&credentials.email) {
            return Err(IdentityError::InvalidEmail);
        }

        if !is_valid_password(&credentials.password) {
            return Err(IdentityError::PasswordTooShort);
        }

        if mode == AuthMode::Signup && !is_present(&credentials.name) {
            return Err(IdentityError::NameRequired);
        }

        Ok(self.login(UserRecord::new(
            credentials.email.trim(),
            credentials.name.trim(),
        )))
    }

    /// Forget the current user and its persisted copy.
    pub fn logout(&mut self) -> LoggedOut {
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "user logged out");
        }

        self.storage.forget(keys::USER);

        LoggedOut(())
    }

    /// Merge `update` into the current user.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotLoggedIn`] when no user is logged in.
    pub fn update_user(&mut self, update: UserUpdate) -> Result<&UserRecord, IdentityError> {
        let user = self.user.as_mut().ok_or(IdentityError::NotLoggedIn)?;

        if let Some(name) = update.name {
            user.name = name;
        }

        if let Some(address) = update.address {
            user.address = address;
        }

        if let Some(phone) = update.phone {
            user.phone = phone;
        }

        if let Some(orders) = update.orders {
            user.orders = orders;
        }

        self.storage.persist(keys::USER, &*user);

        debug!("user updated");

        Ok(&*user)
    }

    /// Validate and store a new shipping address and, optionally, a phone number.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidAddress`] or [`IdentityError::InvalidPhone`] when the
    /// input is malformed and [`IdentityError::NotLoggedIn`] when no user is logged in.
    pub fn update_address(
        &mut self,
        address: &Address,
        phone: Option<&str>,
    ) -> Result<&UserRecord, IdentityError> {
        if !self.is_authenticated() {
            return Err(IdentityError::NotLoggedIn);
        }

        let violations = address.violations();
        if !violations.is_empty() {
            return Err(IdentityError::InvalidAddress(violations));
        }

        let phone = phone.map(str::trim).filter(|phone| !phone.is_empty());
        if phone.is_some_and(|phone| !is_valid_phone(phone)) {
            return Err(IdentityError::InvalidPhone);
        }

        self.update_user(UserUpdate {
            address: Some(address.formatted()),
            phone: phone.map(str::to_string),
            ..UserUpdate::default()
        })
    }

    /// Append `order` to the current user's history.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotLoggedIn`] when no user is logged in.
    pub fn append_order(&mut self, order: Order) -> Result<&UserRecord, IdentityError> {
        let mut orders = self
            .user
            .as_ref()
            .ok_or(IdentityError::NotLoggedIn)?
            .orders
            .clone();

        info!(order = %order.id, total = %order.amounts.total, "order recorded");

        orders.push(order);

        self.update_user(UserUpdate {
            orders: Some(orders),
            ..UserUpdate::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::storage::MemoryStorage;

    use super::*;

    fn store() -> IdentityStore {
        IdentityStore::restore(Arc::new(MemoryStorage::new()))
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "asha@example.in".to_string(),
            password: "secret1".to_string(),
            name: "Asha".to_string(),
        }
    }

    #[test]
    fn authenticate_creates_fresh_record() -> TestResult {
        let mut identity = store();

        let user = identity.authenticate(&credentials(), AuthMode::Signup)?;

        assert_eq!(user.email, "asha@example.in");
        assert_eq!(user.name, "Asha");
        assert!(user.orders.is_empty());
        assert!(identity.is_authenticated());

        Ok(())
    }

    #[test]
    fn authenticate_rejects_bad_input() {
        let mut identity = store();

        let bad_email = Credentials {
            email: "asha".to_string(),
            ..credentials()
        };
        let short_password = Credentials {
            password: "12345".to_string(),
            ..credentials()
        };
        let nameless = Credentials {
            name: "  ".to_string(),
            ..credentials()
        };

        assert_eq!(
            identity.authenticate(&bad_email, AuthMode::Login),
            Err(IdentityError::InvalidEmail)
        );
        assert_eq!(
            identity.authenticate(&short_password, AuthMode::Login),
            Err(IdentityError::PasswordTooShort)
        );
        assert_eq!(
            identity.authenticate(&nameless, AuthMode::Signup),
            Err(IdentityError::NameRequired)
        );
        assert!(identity.authenticate(&nameless, AuthMode::Login).is_ok());
    }

    #[test]
    fn user_survives_restore_and_logout_removes_it() -> TestResult {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        IdentityStore::restore(Arc::clone(&storage)).login(UserRecord::new("a@b.co", "A"));

        let mut restored = IdentityStore::restore(Arc::clone(&storage));
        assert_eq!(restored.current().map(|user| user.name.as_str()), Some("A"));

        let _logged_out = restored.logout();

        assert!(!restored.is_authenticated());
        assert_eq!(storage.get(keys::USER)?, None);

        Ok(())
    }

    #[test]
    fn order_with_missing_fields_keeps_user_logged_in() -> TestResult {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        storage.set(
            keys::USER,
            r#"{"email":"asha@example.in","name":"Asha","orders":[{"id":1,"items":[],"payment":{"method":"cod"}}]}"#,
        )?;

        let restored = IdentityStore::restore(storage);

        assert!(restored.is_authenticated());
        assert_eq!(restored.current().map(|user| user.orders.len()), Some(1));

        Ok(())
    }

    #[test]
    fn update_requires_login() {
        let mut identity = store();

        assert_eq!(
            identity.update_user(UserUpdate::default()),
            Err(IdentityError::NotLoggedIn)
        );
    }

    #[test]
    fn update_merges_only_given_fields() -> TestResult {
        let mut identity = store();
        identity.login(UserRecord {
            phone: "9876543210".to_string(),
            ..UserRecord::new("a@b.co", "A")
        });

        let user = identity.update_user(UserUpdate {
            name: Some("Asha K".to_string()),
            ..UserUpdate::default()
        })?;

        assert_eq!(user.name, "Asha K");
        assert_eq!(user.phone, "9876543210");

        Ok(())
    }

    #[test]
    fn update_address_stores_formatted_string() -> TestResult {
        let mut identity = store();
        identity.login(UserRecord::new("a@b.co", "A"));
        let address = Address::parse("12 MG Road, Flat 4, Bengaluru, Karnataka 560001, India");

        let user = identity.update_address(&address, Some("9876543210"))?;

        assert_eq!(
            user.address,
            "12 MG Road, Flat 4, Bengaluru, Karnataka 560001, India"
        );
        assert_eq!(user.phone, "9876543210");
        assert_eq!(user.parsed_address(), Some(address));

        Ok(())
    }

    #[test]
    fn update_address_rejects_invalid_input() {
        let mut identity = store();
        identity.login(UserRecord::new("a@b.co", "A"));
        let valid = Address::parse("12 MG Road, Flat 4, Bengaluru, Karnataka 560001, India");
        let invalid = Address {
            city: "Bengaluru 1".to_string(),
            ..valid.clone()
        };

        let result = identity.update_address(&invalid, None);
        assert!(
            matches!(&result, Err(IdentityError::InvalidAddress(v)) if v.len() == 1),
            "expected InvalidAddress, got {result:?}"
        );
        assert_eq!(
            result.err().map(|error| error.to_string()),
            Some("City cannot contain numbers.".to_string())
        );

        assert_eq!(
            identity.update_address(&valid, Some("12345")),
            Err(IdentityError::InvalidPhone)
        );
    }
}
