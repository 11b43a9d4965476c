//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable with mocks.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, DeliverySweep, PostcardCommand, PostcardQuery,
    StampCatalogueCommand, StampCatalogueQuery, StampCollectionCommand, StampCollectionQuery,
    StampRequestCommand, StampRequestQuery,
};

use super::secrets::TokenDigest;

/// Parameter object bundling every port implementation.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub postcards: Arc<dyn PostcardCommand>,
    pub postcard_query: Arc<dyn PostcardQuery>,
    pub sweep: Arc<dyn DeliverySweep>,
    pub catalogue: Arc<dyn StampCatalogueCommand>,
    pub catalogue_query: Arc<dyn StampCatalogueQuery>,
    pub requests: Arc<dyn StampRequestCommand>,
    pub request_query: Arc<dyn StampRequestQuery>,
    pub collection: Arc<dyn StampCollectionCommand>,
    pub collection_query: Arc<dyn StampCollectionQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub postcards: Arc<dyn PostcardCommand>,
    pub postcard_query: Arc<dyn PostcardQuery>,
    pub sweep: Arc<dyn DeliverySweep>,
    pub catalogue: Arc<dyn StampCatalogueCommand>,
    pub catalogue_query: Arc<dyn StampCatalogueQuery>,
    pub requests: Arc<dyn StampRequestCommand>,
    pub request_query: Arc<dyn StampRequestQuery>,
    pub collection: Arc<dyn StampCollectionCommand>,
    pub collection_query: Arc<dyn StampCollectionQuery>,
    /// Digest of the scheduler's bearer token; `None` disables token sweeps.
    pub cron_token: Option<TokenDigest>,
}

impl HttpState {
    /// Assemble state from ports and an optional sweep token.
    pub fn new(ports: HttpStatePorts, cron_token: Option<&str>) -> Self {
        let HttpStatePorts {
            accounts,
            account_query,
            postcards,
            postcard_query,
            sweep,
            catalogue,
            catalogue_query,
            requests,
            request_query,
            collection,
            collection_query,
        } = ports;
        Self {
            accounts,
            account_query,
            postcards,
            postcard_query,
            sweep,
            catalogue,
            catalogue_query,
            requests,
            request_query,
            collection,
            collection_query,
            cron_token: cron_token.map(TokenDigest::of),
        }
    }
}
