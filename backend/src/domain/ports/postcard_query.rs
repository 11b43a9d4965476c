//! Driving port for reading postcards and contacts.

use async_trait::async_trait;

use crate::domain::{Contact, Error, Identity, Postcard};

/// Postcard read use-cases. Every call is scoped to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostcardQuery: Send + Sync {
    /// Delivered postcards addressed to the caller, most recent first.
    async fn inbox(&self, identity: &Identity) -> Result<Vec<Postcard>, Error>;

    /// Contact rows owned by the caller, most recent exchange first.
    async fn contacts(&self, identity: &Identity) -> Result<Vec<Contact>, Error>;
}
