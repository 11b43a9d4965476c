//! Driving port for reviewing the request queue.

use async_trait::async_trait;

use crate::domain::{AdminCapability, Error, StampRequest};

/// Admin view of the request queue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampRequestQuery: Send + Sync {
    /// Pending requests, newest first.
    async fn pending(&self, admin: &AdminCapability) -> Result<Vec<StampRequest>, Error>;
}
