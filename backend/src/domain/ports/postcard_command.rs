//! Driving port for sending postcards.

use async_trait::async_trait;

use crate::domain::{Error, Identity, MessageText, Postcard, StampId, UserId};

/// Validated send payload; the sender is the calling identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendPostcardRequest {
    /// Addressee.
    pub recipient: UserId,
    /// Text body.
    pub message: MessageText,
    /// Attached stamps.
    pub stamps: Vec<StampId>,
}

/// Postcard write use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostcardCommand: Send + Sync {
    /// Schedule a postcard for the next delivery slot and record the
    /// exchange in both parties' contact rows.
    async fn send(&self, sender: &Identity, request: SendPostcardRequest) -> Result<Postcard, Error>;
}
