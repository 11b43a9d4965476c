//! Port for the stamp request queue.

use async_trait::async_trait;

use crate::domain::{StampRequest, StampRequestId, StampRequestStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by stamp request repository adapters.
    pub enum StampRequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "stamp request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "stamp request repository query failed: {message}",
    }
}

/// Port for stamp request storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampRequestRepository: Send + Sync {
    /// Store a new request.
    async fn insert(&self, request: &StampRequest) -> Result<(), StampRequestRepositoryError>;

    /// Fetch a request by id.
    async fn find_by_id(
        &self,
        id: &StampRequestId,
    ) -> Result<Option<StampRequest>, StampRequestRepositoryError>;

    /// Pending requests, newest first.
    async fn list_pending(&self) -> Result<Vec<StampRequest>, StampRequestRepositoryError>;

    /// Move `id` from pending to `status` without touching anything else.
    /// Returns the updated request, or `None` when the request is missing or
    /// not pending.
    async fn decide(
        &self,
        id: &StampRequestId,
        status: StampRequestStatus,
    ) -> Result<Option<StampRequest>, StampRequestRepositoryError>;
}
