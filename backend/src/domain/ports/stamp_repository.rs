//! Port for the stamp catalogue.

use async_trait::async_trait;

use crate::domain::{Stamp, StampRequestId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by stamp repository adapters.
    pub enum StampRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "stamp repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "stamp repository query failed: {message}",
        /// The source request is missing or no longer pending.
        RequestNotPending { request_id: String } =>
            "stamp request {request_id} is not pending",
    }
}

/// Port for stamp storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampRepository: Send + Sync {
    /// Insert a stamp that is not tied to a request.
    async fn insert(&self, stamp: &Stamp) -> Result<(), StampRepositoryError>;

    /// Atomically flip `request_id` from pending to approved with a
    /// back-reference to `stamp`, and insert `stamp`. Fails with
    /// [`StampRepositoryError::RequestNotPending`] and writes nothing when
    /// the request is not pending.
    async fn insert_promoted(
        &self,
        stamp: &Stamp,
        request_id: &StampRequestId,
    ) -> Result<(), StampRepositoryError>;

    /// Every stamp, newest first.
    async fn list_all(&self) -> Result<Vec<Stamp>, StampRepositoryError>;

    /// Approved stamps only, newest first.
    async fn list_approved(&self) -> Result<Vec<Stamp>, StampRepositoryError>;
}
