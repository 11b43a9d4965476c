//! Authentication inputs and the identity values handed to services.
//!
//! Handlers resolve the session into an [`Identity`] once and pass it
//! explicitly. Admin-only operations additionally take an
//! [`AdminCapability`], which can only be minted from an admin identity.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, Error, UserId, UserValidationError, Username};

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN: usize = 8;

/// Validation errors for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN`].
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Lower bound.
        min: usize,
    },
    /// Username or email failed validation.
    #[error(transparent)]
    User(#[from] UserValidationError),
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use postcards::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "alice");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs. The password keeps its
    /// whitespace; the username is trimmed.
    pub fn try_from_parts(
        username: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CredentialsValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the lookup.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Clear-text password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated sign-up payload.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl NewAccount {
    /// Validate raw sign-up inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username)?;
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self {
            username,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Requested username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Contact email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Clear-text password to hash.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Encoded password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash read from storage or produced by a hasher.
    #[must_use]
    pub const fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    /// PHC-encoded representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Role carried by an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular account.
    Member,
    /// Curator of the stamp catalogue.
    Admin,
}

impl Role {
    /// Role implied by the stored admin flag.
    #[must_use]
    pub const fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Member }
    }
}

/// Authenticated caller.
///
/// # Examples
/// ```
/// use postcards::domain::{Identity, UserId};
///
/// let member = Identity::member(UserId::random());
/// assert!(member.require_admin().is_err());
///
/// let admin = Identity::admin(UserId::random());
/// assert!(admin.require_admin().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    role: Role,
}

impl Identity {
    /// Identity with an explicit role.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Identity of a regular member.
    #[must_use]
    pub const fn member(user_id: UserId) -> Self {
        Self::new(user_id, Role::Member)
    }

    /// Identity of an admin.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    /// Authenticated user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Caller role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether the caller is an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Mint an admin capability, or fail with `forbidden`.
    pub fn require_admin(&self) -> Result<AdminCapability, Error> {
        if self.is_admin() {
            Ok(AdminCapability {
                admin_id: self.user_id,
            })
        } else {
            Err(Error::forbidden("admin privileges required"))
        }
    }
}

/// Proof that the caller is an admin. Only [`Identity::require_admin`]
/// constructs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    admin_id: UserId,
}

impl AdminCapability {
    /// Admin who holds the capability.
    #[must_use]
    pub const fn admin_id(&self) -> &UserId {
        &self.admin_id
    }
}
