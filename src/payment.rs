//! Payment simulator
//!
//! Payments never leave the process. After a successful re-validation the simulator walks
//! through [`STAGES`] and then settles: [`DECLINE_CARD_NUMBER`] is declined and every other
//! well-formed input is approved. Timing belongs to the caller; see [`STAGE_INTERVAL`].

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    checkout::{CORRECT_FIELDS_MESSAGE, FieldErrors, FieldKey, PaymentDetails},
    orders::{COD_NOTE, OrderDraft, PaymentRecord, PaymentStatus},
    pricing::PaymentMethod,
};

/// Card number that is always declined.
pub const DECLINE_CARD_NUMBER: &str = "4111111111111112";

/// Message shown after a decline.
pub const DECLINE_MESSAGE: &str = "Payment declined. Please check your card details and try again.";

/// Progress texts shown while a payment is processing.
pub const STAGES: [&str; 4] = [
    "Verifying payment details...",
    "Processing payment...",
    "Confirming transaction...",
    "Finalizing order...",
];

/// Default delay between two stages.
pub const STAGE_INTERVAL: Duration = Duration::from_millis(650);

/// Errors raised by the payment simulator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The payment details are for a different method than the order.
    #[error("order is paid by {expected} but {actual} details were given")]
    MethodMismatch {
        /// Method chosen at checkout
        expected: PaymentMethod,

        /// Method of the given details
        actual: PaymentMethod,
    },

    /// A payment is already processing or settled.
    #[error("payment is not idle")]
    NotIdle,

    /// No payment is processing.
    #[error("payment is not processing")]
    NotProcessing,
}

/// Payment phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentPhase {
    /// Details are editable
    Idle,

    /// Processing; `stage` indexes [`STAGES`]
    Processing {
        /// Current stage
        stage: usize,
    },

    /// Approved and final
    Completed(PaymentRecord),
}

/// Result of a submit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Processing has started
    Started,

    /// Details failed validation; focus the given field
    Invalid {
        /// First failing field
        focus: FieldKey,
    },
}

/// Result of settling a processing payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Payment approved
    Approved(PaymentRecord),

    /// Payment declined; the simulator is idle again
    Declined,
}

/// Payment Simulator
#[derive(Debug, Clone)]
pub struct PaymentSimulator {
    draft: OrderDraft,
    details: PaymentDetails,
    phase: PaymentPhase,
    errors: FieldErrors,
    error: Option<&'static str>,
}

impl PaymentSimulator {
    /// Simulator for `draft`, paid with `details`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::MethodMismatch`] when `details` are for another method.
    pub fn new(draft: OrderDraft, details: PaymentDetails) -> Result<Self, PaymentError> {
        if details.method() != draft.payment_method {
            return Err(PaymentError::MethodMismatch {
                expected: draft.payment_method,
                actual: details.method(),
            });
        }

        Ok(Self {
            draft,
            details,
            phase: PaymentPhase::Idle,
            errors: FieldErrors::default(),
            error: None,
        })
    }

    /// Order being paid.
    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Current phase.
    pub fn phase(&self) -> &PaymentPhase {
        &self.phase
    }

    /// Field errors from the last submit.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error from the last submit or decline.
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Payment details.
    pub fn details(&self) -> &PaymentDetails {
        &self.details
    }

    /// Edit the payment details. Only allowed while idle.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotIdle`] while processing or after approval, and
    /// [`PaymentError::MethodMismatch`] when `details` are for another method.
    pub fn set_details(&mut self, details: PaymentDetails) -> Result<(), PaymentError> {
        if self.phase != PaymentPhase::Idle {
            return Err(PaymentError::NotIdle);
        }

        if details.method() != self.draft.payment_method {
            return Err(PaymentError::MethodMismatch {
                expected: self.draft.payment_method,
                actual: details.method(),
            });
        }

        self.details = details;

        Ok(())
    }

    /// Text of the current stage while processing.
    pub fn stage(&self) -> Option<&'static str> {
        match self.phase {
            PaymentPhase::Processing { stage } => STAGES.get(stage).copied(),
            PaymentPhase::Idle | PaymentPhase::Completed(_) => None,
        }
    }

    /// Re-validate the details and start processing.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotIdle`] when a payment is already processing or settled.
    pub fn submit(&mut self) -> Result<Submission, PaymentError> {
        if self.phase != PaymentPhase::Idle {
            return Err(PaymentError::NotIdle);
        }

        self.errors = self.details.validate();

        if let Some(focus) = self.errors.first() {
            self.error = Some(CORRECT_FIELDS_MESSAGE);

            return Ok(Submission::Invalid { focus });
        }

        self.error = None;
        self.phase = PaymentPhase::Processing { stage: 0 };

        debug!(method = %self.draft.payment_method, "payment processing");

        Ok(Submission::Started)
    }

    /// Move to the next stage. Returns the new stage text, or `None` once the last stage has
    /// been shown.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotProcessing`] outside processing.
    pub fn advance(&mut self) -> Result<Option<&'static str>, PaymentError> {
        let PaymentPhase::Processing { stage } = &mut self.phase else {
            return Err(PaymentError::NotProcessing);
        };

        let next = stage.saturating_add(1).min(STAGES.len());
        *stage = next;

        Ok(STAGES.get(next).copied())
    }

    /// Settle the payment.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotProcessing`] outside processing.
    pub fn settle(&mut self) -> Result<Settlement, PaymentError> {
        if !matches!(self.phase, PaymentPhase::Processing { .. }) {
            return Err(PaymentError::NotProcessing);
        }

        let record = match &self.details {
            PaymentDetails::Card(card) if card.digits() == DECLINE_CARD_NUMBER => {
                info!("payment declined");

                self.phase = PaymentPhase::Idle;
                self.error = Some(DECLINE_MESSAGE);

                return Ok(Settlement::Declined);
            }
            PaymentDetails::Card(card) => PaymentRecord::Card {
                last4: card.last4(),
                card_holder: card.name.trim().to_string(),
                status: PaymentStatus::Completed,
            },
            PaymentDetails::Upi(upi) => PaymentRecord::Upi {
                upi_id: upi.id.trim().to_string(),
                status: PaymentStatus::Completed,
            },
            PaymentDetails::Cod => PaymentRecord::Cod {
                status: PaymentStatus::Pending,
                note: COD_NOTE.to_string(),
            },
        };

        info!(method = %record.method(), "payment approved");

        self.phase = PaymentPhase::Completed(record.clone());

        Ok(Settlement::Approved(record))
    }
}
