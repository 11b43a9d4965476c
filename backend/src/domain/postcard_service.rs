//! Postcard services: sending, the recipient inbox, the contact ledger view,
//! and the delivery sweep.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    ContactRepository, ContactRepositoryError, DeliverySweep, DeliverySweepReport,
    PostcardCommand, PostcardQuery, PostcardRepository, PostcardRepositoryError,
    SendPostcardRequest,
};
use crate::domain::{
    Contact, ContactEdge, Error, Identity, Postcard, PostcardDraft, PostcardId,
    PostcardValidationError,
};

fn map_postcard_error(error: PostcardRepositoryError) -> Error {
    match error {
        PostcardRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("postcard repository unavailable: {message}"))
        }
        PostcardRepositoryError::Query { message } => {
            Error::internal(format!("postcard repository error: {message}"))
        }
    }
}

fn map_contact_error(error: ContactRepositoryError) -> Error {
    match error {
        ContactRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("contact repository unavailable: {message}"))
        }
        ContactRepositoryError::Query { message } => {
            Error::internal(format!("contact repository error: {message}"))
        }
    }
}

fn map_draft_error(error: PostcardValidationError) -> Error {
    let field = match error {
        PostcardValidationError::EmptyMessage | PostcardValidationError::MessageTooLong { .. } => {
            "message"
        }
        PostcardValidationError::TooManyStamps { .. } => "stamps",
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": field, "code": "invalid_postcard" }))
}

/// Service implementing [`PostcardCommand`] and [`PostcardQuery`].
#[derive(Clone)]
pub struct PostcardService<P, C> {
    postcards: Arc<P>,
    contacts: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<P, C> PostcardService<P, C> {
    /// Create a service over the postcard store and contact ledger.
    pub fn new(postcards: Arc<P>, contacts: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            postcards,
            contacts,
            clock,
        }
    }
}

#[async_trait]
impl<P, C> PostcardCommand for PostcardService<P, C>
where
    P: PostcardRepository,
    C: ContactRepository,
{
    async fn send(&self, sender: &Identity, request: SendPostcardRequest) -> Result<Postcard, Error> {
        let SendPostcardRequest {
            recipient,
            message,
            stamps,
        } = request;
        let draft = PostcardDraft::try_new(*sender.user_id(), recipient, message, stamps)
            .map_err(map_draft_error)?;
        let postcard = draft.schedule(PostcardId::random(), self.clock.utc());
        let edges = ContactEdge::pair_for(&postcard);

        self.postcards
            .insert_with_contacts(&postcard, &edges)
            .await
            .map_err(map_postcard_error)?;

        info!(
            postcard_id = %postcard.id,
            delivery_date = %postcard.delivery_date,
            "postcard scheduled"
        );
        Ok(postcard)
    }
}

#[async_trait]
impl<P, C> PostcardQuery for PostcardService<P, C>
where
    P: PostcardRepository,
    C: ContactRepository,
{
    async fn inbox(&self, identity: &Identity) -> Result<Vec<Postcard>, Error> {
        self.postcards
            .list_delivered_to(identity.user_id())
            .await
            .map_err(map_postcard_error)
    }

    async fn contacts(&self, identity: &Identity) -> Result<Vec<Contact>, Error> {
        self.contacts
            .list_for_owner(identity.user_id())
            .await
            .map_err(map_contact_error)
    }
}

/// Service implementing [`DeliverySweep`].
#[derive(Clone)]
pub struct DeliverySweepService<P> {
    postcards: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> DeliverySweepService<P> {
    /// Create a sweep over the postcard store.
    pub fn new(postcards: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { postcards, clock }
    }
}

#[async_trait]
impl<P> DeliverySweep for DeliverySweepService<P>
where
    P: PostcardRepository,
{
    async fn run(&self) -> Result<DeliverySweepReport, Error> {
        let now = self.clock.utc();
        let delivered = self
            .postcards
            .deliver_due(now)
            .await
            .map_err(map_postcard_error)?;
        info!(delivered, swept_at = %now, "delivery sweep finished");
        Ok(DeliverySweepReport {
            delivered,
            swept_at: now,
        })
    }
}

#[cfg(test)]
#[path = "postcard_service_tests.rs"]
mod tests;
