//! Buy-now intents
//!
//! A buy-now intent lets a single product skip the cart and go straight to checkout. It is a
//! single-use, time-boxed value: it survives a login redirect through the [`BuyNowSlot`],
//! expires after [`BUY_NOW_TTL`], and once an order has been placed from it the slot remembers
//! its creation time so the same intent cannot be replayed.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::CartLine,
    orders::OrderSource,
    products::Product,
    storage::{Storage, StorageExt, keys},
};

/// How long an unconsumed intent stays usable.
pub const BUY_NOW_TTL: SignedDuration = SignedDuration::from_hours(1);

/// Errors raised when stashing an intent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuyNowError {
    /// The intent has no items.
    #[error("buy-now intent has no items")]
    Empty,

    /// An order has already been placed from this intent.
    #[error("buy-now intent was already used to place an order")]
    AlreadyConsumed,
}

/// Items selected for immediate purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyNowIntent {
    /// Selected lines
    #[serde(default)]
    pub items: Vec<CartLine>,

    /// Creation time, also the intent's identity; a missing time reads as long expired
    #[serde(default)]
    pub created_at: Timestamp,
}

impl BuyNowIntent {
    /// Intent for `quantity` units of `product`. A quantity of 0 is treated as 1.
    pub fn single(product: Product, quantity: u32, now: Timestamp) -> Self {
        Self {
            items: vec![CartLine::new(product, quantity.max(1))],
            created_at: now,
        }
    }

    /// Whether the intent is older than [`BUY_NOW_TTL`] at `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.duration_since(self.created_at) >= BUY_NOW_TTL
    }

    /// Whether the intent can still be checked out at `now`.
    pub fn is_usable(&self, now: Timestamp) -> bool {
        !self.items.is_empty() && !self.is_expired(now)
    }

    /// Order source for orders placed from this intent.
    pub fn source(&self) -> OrderSource {
        OrderSource::BuyNow {
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotRecord {
    #[serde(default)]
    intent: Option<BuyNowIntent>,

    #[serde(default)]
    consumed: Option<Timestamp>,
}

/// Session slot holding at most one pending intent.
pub struct BuyNowSlot {
    storage: Arc<dyn Storage>,
    record: SlotRecord,
}

impl std::fmt::Debug for BuyNowSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuyNowSlot")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl BuyNowSlot {
    /// Restore the slot from storage. A malformed blob yields an empty slot.
    pub fn restore(storage: Arc<dyn Storage>) -> Self {
        let record = storage.restore_or_default(keys::BUY_NOW);

        Self { storage, record }
    }

    /// Store `intent`, replacing any pending one.
    ///
    /// # Errors
    ///
    /// Returns [`BuyNowError::Empty`] for an intent without items and
    /// [`BuyNowError::AlreadyConsumed`] for an intent an order was already placed from.
    pub fn stash(&mut self, intent: BuyNowIntent) -> Result<(), BuyNowError> {
        if intent.items.is_empty() {
            return Err(BuyNowError::Empty);
        }

        if self.is_replay(&intent) {
            return Err(BuyNowError::AlreadyConsumed);
        }

        debug!(created_at = %intent.created_at, "buy-now intent stashed");

        self.record.intent = Some(intent);
        self.commit();

        Ok(())
    }

    /// The pending intent if it is still usable at `now`. Expired or empty intents are
    /// discarded.
    pub fn current(&mut self, now: Timestamp) -> Option<&BuyNowIntent> {
        let usable = self
            .record
            .intent
            .as_ref()
            .is_some_and(|intent| intent.is_usable(now));

        if !usable && self.record.intent.is_some() {
            debug!("discarding stale buy-now intent");
            self.discard();
        }

        self.record.intent.as_ref()
    }

    /// Whether an order has already been placed from `intent`.
    pub fn is_replay(&self, intent: &BuyNowIntent) -> bool {
        self.record.consumed == Some(intent.created_at)
    }

    /// Mark the intent created at `created_at` as used. The pending intent is cleared only when
    /// it is that intent.
    pub fn consume(&mut self, created_at: Timestamp) {
        if self
            .record
            .intent
            .as_ref()
            .is_some_and(|intent| intent.created_at == created_at)
        {
            self.record.intent = None;
        }

        self.record.consumed = Some(created_at);
        self.commit();

        debug!(%created_at, "buy-now intent consumed");
    }

    /// Drop the pending intent without marking it consumed.
    pub fn discard(&mut self) {
        if self.record.intent.take().is_some() {
            self.commit();
        }
    }

    fn commit(&self) {
        self.storage.persist(keys::BUY_NOW, &self.record);
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::storage::MemoryStorage;

    use super::*;

    fn now() -> Result<Timestamp, jiff::Error> {
        "2026-05-10T09:00:00Z".parse()
    }

    fn intent(at: Timestamp) -> BuyNowIntent {
        BuyNowIntent::single(Product::new("dj-4", "Kettle", Decimal::from(30)), 1, at)
    }

    fn slot() -> BuyNowSlot {
        BuyNowSlot::restore(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn stashed_intent_is_current_until_expiry() -> TestResult {
        let now = now()?;
        let mut slot = slot();
        slot.stash(intent(now))?;

        let later = now.checked_add(SignedDuration::from_mins(59))?;
        assert!(slot.current(later).is_some());

        let expired = now.checked_add(BUY_NOW_TTL)?;
        assert!(slot.current(expired).is_none());
        assert!(slot.current(now).is_none(), "expired intent must be discarded");

        Ok(())
    }

    #[test]
    fn consumed_intent_cannot_be_stashed_again() -> TestResult {
        let now = now()?;
        let mut slot = slot();
        slot.stash(intent(now))?;

        slot.consume(now);

        assert!(slot.current(now).is_none());
        assert_eq!(slot.stash(intent(now)), Err(BuyNowError::AlreadyConsumed));

        Ok(())
    }

    #[test]
    fn consuming_another_intent_keeps_pending_one() -> TestResult {
        let now = now()?;
        let earlier = now.checked_sub(SignedDuration::from_mins(5))?;
        let mut slot = slot();
        slot.stash(intent(now))?;

        slot.consume(earlier);

        assert_eq!(slot.current(now), Some(&intent(now)));
        assert!(slot.is_replay(&intent(earlier)));
        assert!(!slot.is_replay(&intent(now)));

        Ok(())
    }

    #[test]
    fn intent_without_creation_time_reads_as_expired() -> TestResult {
        let intent: BuyNowIntent = serde_json::from_str(
            r#"{"items":[{"product":{"id":"dj-4","price":"30"},"quantity":1}]}"#,
        )?;

        assert_eq!(intent.items.len(), 1);
        assert_eq!(intent.created_at, Timestamp::UNIX_EPOCH);
        assert!(!intent.is_usable(now()?));

        Ok(())
    }

    #[test]
    fn empty_intent_is_rejected() -> TestResult {
        let now = now()?;
        let mut empty = intent(now);
        empty.items.clear();

        assert_eq!(slot().stash(empty), Err(BuyNowError::Empty));

        Ok(())
    }

    #[test]
    fn intent_survives_restore() -> TestResult {
        let now = now()?;
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        BuyNowSlot::restore(Arc::clone(&storage)).stash(intent(now))?;

        let mut restored = BuyNowSlot::restore(storage);

        assert_eq!(restored.current(now), Some(&intent(now)));

        Ok(())
    }

    #[test]
    fn discard_does_not_mark_consumed() -> TestResult {
        let now = now()?;
        let mut slot = slot();
        slot.stash(intent(now))?;

        slot.discard();

        assert!(!slot.is_replay(&intent(now)));
        assert!(slot.current(now).is_none());

        Ok(())
    }
}
