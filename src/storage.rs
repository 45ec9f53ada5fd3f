//! Persistence port
//!
//! Every store persists through [`Storage`], a string key-value interface modelled on browser
//! local storage. Values are JSON documents with no versioning; readers must tolerate absent
//! fields.

use std::{
    collections::HashMap,
    io,
    sync::{Mutex, MutexGuard},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Well-known storage keys.
pub mod keys {
    /// Cart lines and total.
    pub const CART: &str = "ecommerce-cart";

    /// Favourite products.
    pub const FAVOURITES: &str = "ecommerce-favourites";

    /// Logged-in user record.
    pub const USER: &str = "ecommerce-user";

    /// Cached catalog and its fetch timestamp.
    pub const PRODUCTS: &str = "ecommerce-products";

    /// Language and currency preference.
    pub const LOCALE: &str = "ecommerce-locale";

    /// Pending buy-now intent.
    pub const BUY_NOW: &str = "ecommerce-buy-now";
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The stored value for a key could not be decoded.
    #[error("malformed value stored under {key}")]
    Malformed {
        /// Storage key
        key: String,

        /// Decoding error
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded.
    #[error("failed to encode value for {key}")]
    Encode {
        /// Storage key
        key: String,

        /// Encoding error
        #[source]
        source: serde_json::Error,
    },

    /// The backend failed to read or write.
    #[error("storage backend I/O error")]
    Io(#[from] io::Error),

    /// The backend lock was poisoned by a panicking writer.
    #[error("storage backend is unavailable")]
    Unavailable,
}

/// Key-value persistence port.
pub trait Storage: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON helpers over any [`Storage`].
pub trait StorageExt: Storage {
    /// Read and decode the JSON value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Malformed`] when the stored value does not decode as `T`.
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    /// Encode `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when encoding or writing fails.
    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;

        self.set(key, &raw)
    }

    /// Read `key`, falling back to `T::default()` when the value is absent, malformed or
    /// unreadable.
    fn restore_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read_json(key) {
            Ok(value) => value.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(key, %error, "discarding persisted state");

                T::default()
            }
        }
    }

    /// Write `value` under `key`, logging instead of failing.
    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(error) = self.write_json(key, value) {
            tracing::warn!(key, %error, "failed to persist state");
        }
    }

    /// Remove `key`, logging instead of failing.
    fn forget(&self, key: &str) {
        if let Err(error) = self.remove(key) {
            tracing::warn!(key, %error, "failed to remove persisted state");
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// In-memory [`Storage`], used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.values.lock().map_err(|_poisoned| StorageError::Unavailable)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values()?.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values()?.remove(key);

        Ok(())
    }
}
