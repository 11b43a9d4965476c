//! Driving port for the stamp request queue.

use async_trait::async_trait;

use crate::domain::{
    AdminCapability, Error, Identity, StampPrompt, StampRequest, StampRequestId,
};

/// Request submissions and the flip-only admin decisions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampRequestCommand: Send + Sync {
    /// Queue a prompt as a pending request from the caller.
    async fn submit(&self, identity: &Identity, prompt: StampPrompt)
    -> Result<StampRequest, Error>;

    /// Flip a pending request to approved without creating a stamp.
    async fn approve(
        &self,
        admin: &AdminCapability,
        request_id: &StampRequestId,
    ) -> Result<StampRequest, Error>;

    /// Flip a pending request to rejected.
    async fn reject(
        &self,
        admin: &AdminCapability,
        request_id: &StampRequestId,
    ) -> Result<StampRequest, Error>;
}
