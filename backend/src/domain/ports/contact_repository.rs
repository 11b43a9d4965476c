//! Port for reading the contact ledger.

use async_trait::async_trait;

use crate::domain::{Contact, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by contact repository adapters.
    pub enum ContactRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "contact repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "contact repository query failed: {message}",
    }
}

/// Read side of the contact ledger. Writes happen alongside postcard sends.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Rows owned by `owner`, most recent exchange first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Contact>, ContactRepositoryError>;
}
