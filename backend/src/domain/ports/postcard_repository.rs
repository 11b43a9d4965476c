//! Port for the postcard store and the contact ledger writes tied to it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ContactEdge, Postcard, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by postcard repository adapters.
    pub enum PostcardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "postcard repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "postcard repository query failed: {message}",
    }
}

/// Port for postcard persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostcardRepository: Send + Sync {
    /// Persist a newly sent postcard and apply both contact upserts as one
    /// unit: either all three writes land or none do.
    ///
    /// Each upsert sets `last_postcard_at` unconditionally and appends the
    /// postcard id only when absent.
    async fn insert_with_contacts(
        &self,
        postcard: &Postcard,
        edges: &[ContactEdge; 2],
    ) -> Result<(), PostcardRepositoryError>;

    /// Delivered postcards addressed to `recipient`, most recent delivery
    /// date first.
    async fn list_delivered_to(
        &self,
        recipient: &UserId,
    ) -> Result<Vec<Postcard>, PostcardRepositoryError>;

    /// Mark every undelivered postcard with `delivery_date <= now` as
    /// delivered at `now`, returning how many changed.
    async fn deliver_due(&self, now: DateTime<Utc>) -> Result<u64, PostcardRepositoryError>;
}
