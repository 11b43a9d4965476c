//! Stamp catalogue, request queue and collection ledger services.
//!
//! Two approval paths exist for requests and stay separate:
//! [`StampRequestCommand::approve`] only flips the status, while
//! [`StampCatalogueCommand::create_stamp_from_request`] creates an approved
//! stamp and approves the request with a back-reference in one unit.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    CollectOutcome, StampCatalogueCommand, StampCatalogueQuery, StampCollectionCommand,
    StampCollectionQuery, StampCollectionRepository, StampCollectionRepositoryError,
    StampPromotion, StampRepository, StampRepositoryError, StampRequestCommand,
    StampRequestQuery, StampRequestRepository, StampRequestRepositoryError,
};
use crate::domain::{
    AdminCapability, CollectedStamp, CollectionEntry, Error, Identity, Stamp, StampDraft,
    StampId, StampOrigin, StampPrompt, StampRequest, StampRequestId, StampRequestStatus,
};

fn map_stamp_error(error: StampRepositoryError) -> Error {
    match error {
        StampRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("stamp repository unavailable: {message}"))
        }
        StampRepositoryError::Query { message } => {
            Error::internal(format!("stamp repository error: {message}"))
        }
        StampRepositoryError::RequestNotPending { .. } => request_already_decided(),
    }
}

fn map_request_error(error: StampRequestRepositoryError) -> Error {
    match error {
        StampRequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("stamp request repository unavailable: {message}"))
        }
        StampRequestRepositoryError::Query { message } => {
            Error::internal(format!("stamp request repository error: {message}"))
        }
    }
}

fn map_collection_error(error: StampCollectionRepositoryError) -> Error {
    match error {
        StampCollectionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("collection repository unavailable: {message}"))
        }
        StampCollectionRepositoryError::Query { message } => {
            Error::internal(format!("collection repository error: {message}"))
        }
    }
}

fn request_not_found() -> Error {
    Error::not_found("stamp request not found")
}

fn request_already_decided() -> Error {
    Error::conflict("stamp request already decided")
}

/// Service implementing the catalogue driving ports.
#[derive(Clone)]
pub struct StampCatalogueService<S, Q> {
    stamps: Arc<S>,
    requests: Arc<Q>,
    clock: Arc<dyn Clock>,
}

impl<S, Q> StampCatalogueService<S, Q> {
    /// Create a service over the stamp catalogue and request queue.
    pub fn new(stamps: Arc<S>, requests: Arc<Q>, clock: Arc<dyn Clock>) -> Self {
        Self {
            stamps,
            requests,
            clock,
        }
    }
}

#[async_trait]
impl<S, Q> StampCatalogueCommand for StampCatalogueService<S, Q>
where
    S: StampRepository,
    Q: StampRequestRepository,
{
    async fn create_stamp(
        &self,
        admin: &AdminCapability,
        draft: StampDraft,
    ) -> Result<Stamp, Error> {
        let stamp = draft.into_direct(StampId::random(), self.clock.utc());
        self.stamps.insert(&stamp).await.map_err(map_stamp_error)?;
        info!(stamp_id = %stamp.id, admin_id = %admin.admin_id(), "stamp created");
        Ok(stamp)
    }

    async fn create_stamp_from_request(
        &self,
        admin: &AdminCapability,
        request_id: &StampRequestId,
        draft: StampDraft,
    ) -> Result<StampPromotion, Error> {
        let mut request = self
            .requests
            .find_by_id(request_id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(request_not_found)?;
        if !request.is_pending() {
            return Err(request_already_decided());
        }

        let origin = StampOrigin {
            request_id: request.id,
            prompt: request.prompt.as_ref().to_owned(),
            submitted_by: request.submitted_by,
        };
        let stamp = draft.into_promoted(StampId::random(), origin, self.clock.utc());
        self.stamps
            .insert_promoted(&stamp, request_id)
            .await
            .map_err(map_stamp_error)?;

        request.status = StampRequestStatus::Approved;
        request.stamp_id = Some(stamp.id);
        info!(
            stamp_id = %stamp.id,
            request_id = %request.id,
            admin_id = %admin.admin_id(),
            "stamp request promoted"
        );
        Ok(StampPromotion { stamp, request })
    }
}

#[async_trait]
impl<S, Q> StampCatalogueQuery for StampCatalogueService<S, Q>
where
    S: StampRepository,
    Q: StampRequestRepository,
{
    async fn all_stamps(&self, _admin: &AdminCapability) -> Result<Vec<Stamp>, Error> {
        self.stamps.list_all().await.map_err(map_stamp_error)
    }

    async fn shop(&self, _identity: &Identity) -> Result<Vec<Stamp>, Error> {
        self.stamps.list_approved().await.map_err(map_stamp_error)
    }
}

/// Service implementing the request queue driving ports.
#[derive(Clone)]
pub struct StampRequestService<Q> {
    requests: Arc<Q>,
    clock: Arc<dyn Clock>,
}

impl<Q> StampRequestService<Q> {
    /// Create a service over the request queue.
    pub fn new(requests: Arc<Q>, clock: Arc<dyn Clock>) -> Self {
        Self { requests, clock }
    }
}

impl<Q> StampRequestService<Q>
where
    Q: StampRequestRepository,
{
    async fn decide(
        &self,
        request_id: &StampRequestId,
        status: StampRequestStatus,
    ) -> Result<StampRequest, Error> {
        if let Some(updated) = self
            .requests
            .decide(request_id, status)
            .await
            .map_err(map_request_error)?
        {
            return Ok(updated);
        }
        match self
            .requests
            .find_by_id(request_id)
            .await
            .map_err(map_request_error)?
        {
            Some(_) => Err(request_already_decided()),
            None => Err(request_not_found()),
        }
    }
}

#[async_trait]
impl<Q> StampRequestCommand for StampRequestService<Q>
where
    Q: StampRequestRepository,
{
    async fn submit(
        &self,
        identity: &Identity,
        prompt: StampPrompt,
    ) -> Result<StampRequest, Error> {
        let request = StampRequest::submit(
            StampRequestId::random(),
            prompt,
            *identity.user_id(),
            self.clock.utc(),
        );
        self.requests
            .insert(&request)
            .await
            .map_err(map_request_error)?;
        info!(request_id = %request.id, "stamp request submitted");
        Ok(request)
    }

    async fn approve(
        &self,
        admin: &AdminCapability,
        request_id: &StampRequestId,
    ) -> Result<StampRequest, Error> {
        let request = self.decide(request_id, StampRequestStatus::Approved).await?;
        info!(request_id = %request.id, admin_id = %admin.admin_id(), "stamp request approved");
        Ok(request)
    }

    async fn reject(
        &self,
        admin: &AdminCapability,
        request_id: &StampRequestId,
    ) -> Result<StampRequest, Error> {
        let request = self.decide(request_id, StampRequestStatus::Rejected).await?;
        info!(request_id = %request.id, admin_id = %admin.admin_id(), "stamp request rejected");
        Ok(request)
    }
}

#[async_trait]
impl<Q> StampRequestQuery for StampRequestService<Q>
where
    Q: StampRequestRepository,
{
    async fn pending(&self, _admin: &AdminCapability) -> Result<Vec<StampRequest>, Error> {
        self.requests.list_pending().await.map_err(map_request_error)
    }
}

/// Service implementing the collection ledger driving ports.
#[derive(Clone)]
pub struct StampCollectionService<L> {
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L> StampCollectionService<L> {
    /// Create a service over the collection ledger.
    pub fn new(ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { ledger, clock }
    }
}

#[async_trait]
impl<L> StampCollectionCommand for StampCollectionService<L>
where
    L: StampCollectionRepository,
{
    async fn collect(
        &self,
        identity: &Identity,
        stamp_id: &StampId,
    ) -> Result<CollectionEntry, Error> {
        let entry = CollectionEntry {
            user_id: *identity.user_id(),
            stamp_id: *stamp_id,
            collected_at: self.clock.utc(),
        };
        match self
            .ledger
            .insert_if_absent(&entry)
            .await
            .map_err(map_collection_error)?
        {
            CollectOutcome::Inserted => Ok(entry),
            CollectOutcome::AlreadyCollected => Err(Error::conflict("already collected")),
        }
    }
}

#[async_trait]
impl<L> StampCollectionQuery for StampCollectionService<L>
where
    L: StampCollectionRepository,
{
    async fn collected(&self, identity: &Identity) -> Result<Vec<CollectedStamp>, Error> {
        self.ledger
            .list_for_user(identity.user_id())
            .await
            .map_err(map_collection_error)
    }
}

#[cfg(test)]
#[path = "stamp_service_tests.rs"]
mod tests;
