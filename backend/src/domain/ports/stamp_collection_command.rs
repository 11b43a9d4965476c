//! Driving port for collecting stamps.

use async_trait::async_trait;

use crate::domain::{CollectionEntry, Error, Identity, StampId};

/// Collection ledger writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampCollectionCommand: Send + Sync {
    /// Claim `stamp_id` for the caller. A second claim is a `conflict`.
    async fn collect(&self, identity: &Identity, stamp_id: &StampId)
    -> Result<CollectionEntry, Error>;
}
