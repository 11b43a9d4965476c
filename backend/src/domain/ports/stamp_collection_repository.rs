//! Port for the collection ledger.

use async_trait::async_trait;

use crate::domain::{CollectedStamp, CollectionEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by collection ledger adapters.
    pub enum StampCollectionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "collection repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "collection repository query failed: {message}",
    }
}

/// Outcome of an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectOutcome {
    /// The entry was written.
    Inserted,
    /// An entry for the same (user, stamp) already existed; nothing written.
    AlreadyCollected,
}

/// Port for collection ledger storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampCollectionRepository: Send + Sync {
    /// Write `entry` unless the (user, stamp) pair already exists. The check
    /// and the write are a single atomic step.
    async fn insert_if_absent(
        &self,
        entry: &CollectionEntry,
    ) -> Result<CollectOutcome, StampCollectionRepositoryError>;

    /// Stamps collected by `user_id`, most recent claim first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CollectedStamp>, StampCollectionRepositoryError>;
}
