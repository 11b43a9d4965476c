//! Catalogue stamps and the collection ledger entries that reference them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{StampRequestId, UserId};

/// Maximum stamp name length in characters.
pub const STAMP_NAME_MAX: usize = 100;
/// Maximum stamp description length in characters.
pub const STAMP_DESCRIPTION_MAX: usize = 1000;
const IMAGE_SCHEMES: [&str; 3] = ["https", "http", "data"];

/// Validation errors for stamp drafts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StampValidationError {
    /// Identifier is not a UUID.
    #[error("stamp id must be a valid UUID")]
    InvalidId,
    /// Name was blank.
    #[error("stamp name must not be empty")]
    EmptyName,
    /// Name exceeds [`STAMP_NAME_MAX`].
    #[error("stamp name must be at most {max} characters")]
    NameTooLong {
        /// Upper bound.
        max: usize,
    },
    /// Description exceeds [`STAMP_DESCRIPTION_MAX`].
    #[error("stamp description must be at most {max} characters")]
    DescriptionTooLong {
        /// Upper bound.
        max: usize,
    },
    /// Image reference is not an absolute URI with an accepted scheme.
    #[error("image reference must be an http(s) or data URI")]
    InvalidImage,
}

/// Stamp identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "a3bb189e-8bf9-3888-9912-ace4e6543002")]
pub struct StampId(Uuid);

impl StampId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, StampValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| StampValidationError::InvalidId)
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

impl fmt::Display for StampId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque image reference, validated as an absolute URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef(String);

impl ImageRef {
    /// Validate an image reference.
    ///
    /// # Examples
    /// ```
    /// use postcards::domain::ImageRef;
    ///
    /// assert!(ImageRef::new("https://cdn.example.com/owl.png").is_ok());
    /// assert!(ImageRef::new("data:image/png;base64,iVBORw0KGgo=").is_ok());
    /// assert!(ImageRef::new("owl.png").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, StampValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        let url = Url::parse(trimmed).map_err(|_| StampValidationError::InvalidImage)?;
        if !IMAGE_SCHEMES.contains(&url.scheme()) {
            return Err(StampValidationError::InvalidImage);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ImageRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageRef {
    type Error = StampValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Admin-supplied stamp content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampDraft {
    name: String,
    description: String,
    image: ImageRef,
}

impl StampDraft {
    /// Validate stamp content. Name and description are trimmed.
    pub fn try_new(
        name: &str,
        description: &str,
        image: ImageRef,
    ) -> Result<Self, StampValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StampValidationError::EmptyName);
        }
        if name.chars().count() > STAMP_NAME_MAX {
            return Err(StampValidationError::NameTooLong {
                max: STAMP_NAME_MAX,
            });
        }
        let description = description.trim();
        if description.chars().count() > STAMP_DESCRIPTION_MAX {
            return Err(StampValidationError::DescriptionTooLong {
                max: STAMP_DESCRIPTION_MAX,
            });
        }
        Ok(Self {
            name: name.to_owned(),
            description: description.to_owned(),
            image,
        })
    }

    /// Stamp created directly by an admin. Not listed in the shop.
    #[must_use]
    pub fn into_direct(self, id: StampId, now: DateTime<Utc>) -> Stamp {
        Stamp {
            id,
            name: self.name,
            description: self.description,
            image: self.image,
            approved: false,
            origin: None,
            created_at: now,
        }
    }

    /// Approved stamp promoted from `origin`.
    #[must_use]
    pub fn into_promoted(self, id: StampId, origin: StampOrigin, now: DateTime<Utc>) -> Stamp {
        Stamp {
            id,
            name: self.name,
            description: self.description,
            image: self.image,
            approved: true,
            origin: Some(origin),
            created_at: now,
        }
    }
}

/// Request a promoted stamp was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StampOrigin {
    /// Source request.
    pub request_id: StampRequestId,
    /// Prompt copied from the request.
    pub prompt: String,
    /// Request author.
    #[schema(value_type = String)]
    pub submitted_by: UserId,
}

/// Catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    /// Identifier.
    pub id: StampId,
    /// Display name.
    #[schema(example = "Mossy owl")]
    pub name: String,
    /// Longer description, possibly empty.
    pub description: String,
    /// Image reference.
    #[schema(value_type = String, example = "https://cdn.example.com/owl.png")]
    pub image: ImageRef,
    /// Listed in the shop when true.
    pub approved: bool,
    /// Present when promoted from a request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<StampOrigin>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Collection ledger entry: `user_id` owns `stamp_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntry {
    /// Collector.
    #[schema(value_type = String)]
    pub user_id: UserId,
    /// Collected stamp.
    pub stamp_id: StampId,
    /// Claim instant.
    pub collected_at: DateTime<Utc>,
}

/// Stamp joined with the caller's claim instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectedStamp {
    /// Catalogue entry.
    pub stamp: Stamp,
    /// Claim instant.
    pub collected_at: DateTime<Utc>,
}
