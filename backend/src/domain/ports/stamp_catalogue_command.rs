//! Driving port for admin stamp creation.

use async_trait::async_trait;

use crate::domain::{AdminCapability, Error, Stamp, StampDraft, StampRequest, StampRequestId};

/// Stamp and request state after a promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampPromotion {
    /// Newly created, approved stamp.
    pub stamp: Stamp,
    /// Source request, now approved and pointing at `stamp`.
    pub request: StampRequest,
}

/// Admin-only catalogue writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampCatalogueCommand: Send + Sync {
    /// Create a stamp not tied to any request. It is not listed in the shop.
    async fn create_stamp(&self, admin: &AdminCapability, draft: StampDraft)
    -> Result<Stamp, Error>;

    /// Create an approved stamp from a pending request and approve the
    /// request with a back-reference, as one unit.
    async fn create_stamp_from_request(
        &self,
        admin: &AdminCapability,
        request_id: &StampRequestId,
        draft: StampDraft,
    ) -> Result<StampPromotion, Error>;
}
