//! Account services: sign-up, log-in, profile lookup and user search.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    AccountCommand, AccountQuery, PasswordHasher, PasswordHasherError, USER_SEARCH_LIMIT,
    UserAccount, UserRepository, UserRepositoryError,
};
use crate::domain::{
    EmailAddress, Error, Identity, LoginCredentials, NewAccount, Role, User, UserId, UserSummary,
    Username,
};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername { .. } => Error::conflict("username already exists")
            .with_details(json!({ "field": "username", "code": "duplicate" })),
        UserRepositoryError::DuplicateEmail => Error::conflict("email already exists")
            .with_details(json!({ "field": "email", "code": "duplicate" })),
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(format!("credential processing failed: {error}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Service implementing the account driving ports.
#[derive(Clone)]
pub struct AccountService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<R, H> AccountService<R, H> {
    /// Create a service over a user repository and password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<R, H> AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn register(
        &self,
        username: Username,
        email: EmailAddress,
        password: &str,
        role: Role,
    ) -> Result<User, Error> {
        let password_hash = self.hasher.hash(password).map_err(map_hasher_error)?;
        let user = User::new(
            UserId::random(),
            username,
            email,
            matches!(role, Role::Admin),
            self.clock.utc(),
        );
        self.users
            .insert(&UserAccount {
                user: user.clone(),
                password_hash,
            })
            .await
            .map_err(map_repository_error)?;
        Ok(user)
    }

    /// Make sure an admin account named `username` exists, creating it with
    /// `password` when missing. An existing non-admin account with the same
    /// name is left untouched and reported as a conflict.
    pub async fn ensure_admin(&self, username: Username, password: &str) -> Result<User, Error> {
        if let Some(account) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_repository_error)?
        {
            if account.user.is_admin() {
                return Ok(account.user);
            }
            warn!(username = %username, "configured admin username belongs to a member account");
            return Err(Error::conflict(
                "configured admin username belongs to a member account",
            ));
        }

        let email = EmailAddress::new(format!("{username}@admin.invalid"))
            .map_err(|err| Error::internal(format!("admin email: {err}")))?;
        let user = self.register(username, email, password, Role::Admin).await?;
        info!(user_id = %user.id(), "admin account created");
        Ok(user)
    }
}

#[async_trait]
impl<R, H> AccountCommand for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn sign_up(&self, account: NewAccount) -> Result<User, Error> {
        let user = self
            .register(
                account.username().clone(),
                account.email().clone(),
                account.password(),
                Role::Member,
            )
            .await?;
        info!(user_id = %user.id(), "account registered");
        Ok(user)
    }

    async fn log_in(&self, credentials: &LoginCredentials) -> Result<Identity, Error> {
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(invalid_credentials());
        };
        let Some(account) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_repository_error)?
        else {
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(invalid_credentials());
        }

        Ok(Identity::new(
            *account.user.id(),
            Role::from_admin_flag(account.user.is_admin()),
        ))
    }
}

#[async_trait]
impl<R, H> AccountQuery for AccountService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn current_user(&self, identity: &Identity) -> Result<User, Error> {
        self.users
            .find_by_id(identity.user_id())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))
    }

    async fn holds_admin_role(&self, identity: &Identity) -> Result<bool, Error> {
        let stored = self
            .users
            .find_by_id(identity.user_id())
            .await
            .map_err(map_repository_error)?;
        Ok(stored.is_some_and(|user| user.is_admin()))
    }

    async fn search(&self, identity: &Identity, query: &str) -> Result<Vec<UserSummary>, Error> {
        let needle = query.trim();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = self
            .users
            .search(needle, identity.user_id(), USER_SEARCH_LIMIT)
            .await
            .map_err(map_repository_error)?;
        found.retain(|summary| &summary.id != identity.user_id());
        found.truncate(USER_SEARCH_LIMIT);
        Ok(found)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
