//! User accounts and the value types that identify them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Minimum username length in characters.
pub const USERNAME_MIN: usize = 3;
/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 32;
/// Maximum email length in characters.
pub const EMAIL_MAX: usize = 254;

/// Validation errors for user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username is outside the allowed length range.
    #[error("username must be between {min} and {max} characters")]
    UsernameLength {
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },
    /// Username contains characters outside `[A-Za-z0-9_.-]`.
    #[error("username may only contain letters, digits, '_', '-' or '.'")]
    UsernameCharacters,
    /// Email is not of the form `local@domain`.
    #[error("email address is not valid")]
    InvalidEmail,
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its hyphenated string form.
    ///
    /// # Examples
    /// ```
    /// use postcards::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// assert!(UserId::new("alice").is_err());
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Public handle chosen at sign-up. Comparison is case-sensitive but
/// uniqueness and search are case-insensitive in the stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let length = trimmed.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
            return Err(UserValidationError::UsernameLength {
                min: USERNAME_MIN,
                max: USERNAME_MAX,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(UserValidationError::UsernameCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact email, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        let normalised = value.trim().to_ascii_lowercase();
        if normalised.chars().count() > EMAIL_MAX || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        match normalised.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(normalised))
            }
            _ => Err(UserValidationError::InvalidEmail),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered account as exposed to callers. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "alice")]
    username: Username,
    #[schema(value_type = String, example = "alice@example.com")]
    email: EmailAddress,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    #[must_use]
    pub const fn new(
        id: UserId,
        username: Username,
        email: EmailAddress,
        is_admin: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            is_admin,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Public handle.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Contact email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Whether the account holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Registration instant.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Search-result projection of this user.
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Projection returned by user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Stable identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: UserId,
    /// Public handle.
    #[schema(value_type = String, example = "bob")]
    pub username: Username,
}
