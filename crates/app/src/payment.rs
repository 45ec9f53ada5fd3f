//! Timed payment gateway
//!
//! Drives a [`PaymentSimulator`] through its stages in real time.

use std::time::Duration;

use elancart::{
    checkout::FieldKey,
    payment::{PaymentError, PaymentSimulator, Settlement, Submission},
};
use tokio::time::sleep;
use tracing::info;

/// Outcome of one gateway run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// Details failed validation; nothing was processed
    Invalid {
        /// First failing field
        focus: FieldKey,
    },

    /// Processing finished
    Settled(Settlement),
}

/// Payment gateway with a fixed delay between stages.
#[derive(Debug, Clone, Copy)]
pub struct PaymentGateway {
    interval: Duration,
}

impl PaymentGateway {
    /// Gateway waiting `interval` after each stage.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Submit, report every stage to `on_stage` and settle.
    ///
    /// Dropping the future while processing leaves the simulator processing; it is never
    /// settled twice.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] when the simulator is not idle.
    pub async fn run(
        &self,
        simulator: &mut PaymentSimulator,
        mut on_stage: impl FnMut(&'static str) + Send,
    ) -> Result<GatewayOutcome, PaymentError> {
        if let Submission::Invalid { focus } = simulator.submit()? {
            return Ok(GatewayOutcome::Invalid { focus });
        }

        if let Some(stage) = simulator.stage() {
            on_stage(stage);
        }

        loop {
            sleep(self.interval).await;

            match simulator.advance()? {
                Some(stage) => on_stage(stage),
                None => break,
            }
        }

        let settlement = simulator.settle()?;

        info!(approved = matches!(settlement, Settlement::Approved(_)), "payment settled");

        Ok(GatewayOutcome::Settled(settlement))
    }
}
