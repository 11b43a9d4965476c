//! User-submitted stamp ideas awaiting an admin decision.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StampId, UserId};

/// Maximum prompt length in characters.
pub const PROMPT_MAX: usize = 500;

/// Validation errors for stamp requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StampRequestValidationError {
    /// Identifier is not a UUID.
    #[error("stamp request id must be a valid UUID")]
    InvalidId,
    /// Prompt was blank.
    #[error("prompt must not be empty")]
    EmptyPrompt,
    /// Prompt exceeds [`PROMPT_MAX`].
    #[error("prompt must be at most {max} characters")]
    PromptTooLong {
        /// Upper bound.
        max: usize,
    },
    /// Unknown status label.
    #[error("unknown stamp request status: {0}")]
    UnknownStatus(String),
}

/// Stamp request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "9b2d3f1e-4c5a-4e8b-9f7d-2a1b3c4d5e6f")]
pub struct StampRequestId(Uuid);

impl StampRequestId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, StampRequestValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| StampRequestValidationError::InvalidId)
    }

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

impl fmt::Display for StampRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trimmed, non-empty request prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StampPrompt(String);

impl StampPrompt {
    /// Validate a prompt.
    pub fn new(value: impl Into<String>) -> Result<Self, StampRequestValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StampRequestValidationError::EmptyPrompt);
        }
        if trimmed.chars().count() > PROMPT_MAX {
            return Err(StampRequestValidationError::PromptTooLong { max: PROMPT_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for StampPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<StampPrompt> for String {
    fn from(value: StampPrompt) -> Self {
        value.0
    }
}

impl TryFrom<String> for StampPrompt {
    type Error = StampRequestValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Review state of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StampRequestStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Accepted, with or without a resulting stamp.
    Approved,
    /// Declined.
    Rejected,
}

impl StampRequestStatus {
    /// Storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StampRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StampRequestStatus {
    type Err = StampRequestValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(StampRequestValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Stored stamp request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StampRequest {
    /// Identifier.
    pub id: StampRequestId,
    /// Idea text.
    #[schema(value_type = String, example = "an owl wearing a moss scarf")]
    pub prompt: StampPrompt,
    /// Author.
    #[schema(value_type = String)]
    pub submitted_by: UserId,
    /// Review state.
    pub status: StampRequestStatus,
    /// Submission instant.
    pub created_at: DateTime<Utc>,
    /// Stamp created from this request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp_id: Option<StampId>,
}

impl StampRequest {
    /// New pending request.
    #[must_use]
    pub const fn submit(
        id: StampRequestId,
        prompt: StampPrompt,
        submitted_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            prompt,
            submitted_by,
            status: StampRequestStatus::Pending,
            created_at: now,
            stamp_id: None,
        }
    }

    /// Whether an admin decision is still outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == StampRequestStatus::Pending
    }
}
