//! Driving port for the daily delivery sweep.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;

/// Result of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySweepReport {
    /// Postcards moved to delivered by this run.
    pub delivered: u64,
    /// Instant used as `now` for the run.
    pub swept_at: DateTime<Utc>,
}

/// Sweep use-case. Callers authorise the trigger; the sweep itself takes no
/// identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliverySweep: Send + Sync {
    /// Deliver every due postcard. Re-running with nothing due reports zero.
    async fn run(&self) -> Result<DeliverySweepReport, Error>;
}
