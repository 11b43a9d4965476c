//! Driving port for account lookups.

use async_trait::async_trait;

use crate::domain::{Error, Identity, User, UserSummary};

/// Largest number of users returned by a search.
pub const USER_SEARCH_LIMIT: usize = 10;

/// Read-only account use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Profile of the caller.
    async fn current_user(&self, identity: &Identity) -> Result<User, Error>;

    /// Users whose username contains `query`, excluding the caller, capped at
    /// [`USER_SEARCH_LIMIT`]. A blank query yields an empty list.
    async fn search(&self, identity: &Identity, query: &str) -> Result<Vec<UserSummary>, Error>;

    /// Whether the stored account behind `identity` still carries the admin
    /// flag. A deleted account counts as not admin.
    async fn holds_admin_role(&self, identity: &Identity) -> Result<bool, Error>;
}
