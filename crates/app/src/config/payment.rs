//! Payment Config

use std::time::Duration;

use clap::Args;

/// Payment simulator settings.
#[derive(Debug, Args)]
pub struct PaymentConfig {
    /// Delay between payment progress stages, in milliseconds
    #[arg(long, env = "PAYMENT_STAGE_INTERVAL_MS", default_value_t = 650_u64)]
    pub payment_stage_interval_ms: u64,
}

impl PaymentConfig {
    /// Delay between payment progress stages.
    #[must_use]
    pub fn stage_interval(&self) -> Duration {
        Duration::from_millis(self.payment_stage_interval_ms)
    }
}
