//! Postcards exchanged between two users.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StampId, UserId, next_delivery_instant};

/// Maximum message length in characters after trimming.
pub const MESSAGE_MAX: usize = 2000;
/// Maximum number of stamps attached to one postcard.
pub const STAMPS_MAX: usize = 20;

/// Validation errors for outgoing postcards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostcardValidationError {
    /// Message was blank.
    #[error("message must not be empty")]
    EmptyMessage,
    /// Message exceeds [`MESSAGE_MAX`].
    #[error("message must be at most {max} characters")]
    MessageTooLong {
        /// Upper bound.
        max: usize,
    },
    /// More than [`STAMPS_MAX`] stamps.
    #[error("at most {max} stamps may be attached")]
    TooManyStamps {
        /// Upper bound.
        max: usize,
    },
}

/// Postcard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
pub struct PostcardId(Uuid);

impl PostcardId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PostcardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty postcard text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageText(String);

impl MessageText {
    /// Validate message text.
    pub fn new(value: impl Into<String>) -> Result<Self, PostcardValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PostcardValidationError::EmptyMessage);
        }
        if trimmed.chars().count() > MESSAGE_MAX {
            return Err(PostcardValidationError::MessageTooLong { max: MESSAGE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MessageText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<MessageText> for String {
    fn from(value: MessageText) -> Self {
        value.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = PostcardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Outgoing postcard before it is scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostcardDraft {
    sender: UserId,
    recipient: UserId,
    message: MessageText,
    stamps: Vec<StampId>,
}

impl PostcardDraft {
    /// Validate a draft. Duplicate stamp references are collapsed, keeping
    /// first-seen order. A sender may address a postcard to themself.
    pub fn try_new(
        sender: UserId,
        recipient: UserId,
        message: MessageText,
        stamps: Vec<StampId>,
    ) -> Result<Self, PostcardValidationError> {
        let mut unique = Vec::with_capacity(stamps.len());
        for stamp in stamps {
            if !unique.contains(&stamp) {
                unique.push(stamp);
            }
        }
        if unique.len() > STAMPS_MAX {
            return Err(PostcardValidationError::TooManyStamps { max: STAMPS_MAX });
        }
        Ok(Self {
            sender,
            recipient,
            message,
            stamps: unique,
        })
    }

    /// Schedule the draft for the next delivery slot after `now`.
    #[must_use]
    pub fn schedule(self, id: PostcardId, now: DateTime<Utc>) -> Postcard {
        Postcard {
            id,
            sender: self.sender,
            recipient: self.recipient,
            message: self.message,
            stamps: self.stamps,
            created_at: now,
            delivery_date: next_delivery_instant(now),
            delivered: false,
            delivered_at: None,
            opened: false,
        }
    }
}

/// Stored postcard.
///
/// ## Invariants
/// - `delivery_date` is the first delivery slot strictly after `created_at`.
/// - `delivered` implies `delivered_at >= delivery_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Postcard {
    /// Identifier.
    pub id: PostcardId,
    /// Author.
    #[schema(value_type = String)]
    pub sender: UserId,
    /// Addressee.
    #[schema(value_type = String)]
    pub recipient: UserId,
    /// Text body.
    #[schema(value_type = String, example = "Hello")]
    pub message: MessageText,
    /// Attached stamps.
    #[schema(value_type = Vec<String>)]
    pub stamps: Vec<StampId>,
    /// Send instant.
    pub created_at: DateTime<Utc>,
    /// Scheduled visibility instant.
    pub delivery_date: DateTime<Utc>,
    /// Whether a sweep has delivered the postcard.
    pub delivered: bool,
    /// Instant of the delivering sweep.
    pub delivered_at: Option<DateTime<Utc>>,
    /// Whether the recipient has opened it.
    pub opened: bool,
}

impl Postcard {
    /// Whether a sweep at `now` should deliver this postcard.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.delivered && self.delivery_date <= now
    }

    /// Mark delivered at `now`. No-op if already delivered.
    pub fn deliver(&mut self, now: DateTime<Utc>) {
        if !self.delivered {
            self.delivered = true;
            self.delivered_at = Some(now);
        }
    }
}
