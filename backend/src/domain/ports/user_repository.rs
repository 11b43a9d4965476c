//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::{PasswordHash, User, UserId, UserSummary, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username already exists: {username}",
        /// Another account already uses the email.
        DuplicateEmail => "email already exists",
    }
}

/// Stored account together with its credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public profile.
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: PasswordHash,
}

/// Port for user storage.
///
/// Username uniqueness is case-insensitive. Search matches `needle` as a
/// literal, case-insensitive substring of the username.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, failing on duplicate username or email.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserRepositoryError>;

    /// Look an account up by username, ignoring case.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Fetch a user profile by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Up to `limit` users whose username contains `needle`, excluding
    /// `exclude`, ordered by username.
    async fn search(
        &self,
        needle: &str,
        exclude: &UserId,
        limit: usize,
    ) -> Result<Vec<UserSummary>, UserRepositoryError>;
}
