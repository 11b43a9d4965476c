//! Driving port for sign-up and log-in.

use async_trait::async_trait;

use crate::domain::{Error, Identity, LoginCredentials, NewAccount, User};

/// Account use-cases that change or authenticate state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Register a regular account.
    async fn sign_up(&self, account: NewAccount) -> Result<User, Error>;

    /// Authenticate credentials. Unknown users and wrong passwords fail
    /// identically with `unauthorized`.
    async fn log_in(&self, credentials: &LoginCredentials) -> Result<Identity, Error>;
}
