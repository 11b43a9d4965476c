//! Driving port for catalogue listings.

use async_trait::async_trait;

use crate::domain::{AdminCapability, Error, Identity, Stamp};

/// Catalogue reads at two visibility levels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StampCatalogueQuery: Send + Sync {
    /// Every stamp, newest first.
    async fn all_stamps(&self, admin: &AdminCapability) -> Result<Vec<Stamp>, Error>;

    /// Approved stamps, newest first.
    async fn shop(&self, identity: &Identity) -> Result<Vec<Stamp>, Error>;
}
