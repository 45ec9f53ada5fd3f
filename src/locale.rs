//! Locale preference

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageExt, keys};

/// Language and currency preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalePreference {
    /// Language code
    #[serde(default = "default_lang")]
    pub lang: String,

    /// Display currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for LocalePreference {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            currency: default_currency(),
        }
    }
}

/// Persisted locale preference.
pub struct LocaleStore {
    storage: Arc<dyn Storage>,
    preference: LocalePreference,
}

impl std::fmt::Debug for LocaleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleStore")
            .field("preference", &self.preference)
            .finish_non_exhaustive()
    }
}

impl LocaleStore {
    /// Restore the preference, falling back to `en` / `INR`.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let preference = storage.restore_or_default(keys::LOCALE);

        Self {
            storage,
            preference,
        }
    }

    /// Current preference.
    pub fn preference(&self) -> &LocalePreference {
        &self.preference
    }

    /// Change the language.
    pub fn set_lang(&mut self, lang: impl Into<String>) {
        self.preference.lang = lang.into();
        self.storage.persist(keys::LOCALE, &self.preference);
    }

    /// Change the display currency.
    pub fn set_currency(&mut self, currency: impl Into<String>) {
        self.preference.currency = currency.into();
        self.storage.persist(keys::LOCALE, &self.preference);
    }
}
