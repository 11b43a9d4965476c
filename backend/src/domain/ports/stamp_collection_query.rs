//! Driving port for listing a user's collection.

use async_trait::async_trait;

use crate::domain::{CollectedStamp, Error, Identity};

/// Collection ledger reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampCollectionQuery: Send + Sync {
    /// Stamps the caller has collected, most recent claim first.
    async fn collected(&self, identity: &Identity) -> Result<Vec<CollectedStamp>, Error>;
}
