//! Wiring of outbound adapters into domain services and HTTP ports.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use postcards::domain::ports::{
    ContactRepository, PostcardRepository, StampCollectionRepository, StampRepository,
    StampRequestRepository, UserRepository,
};
use postcards::domain::{
    AccountService, DeliverySweepService, Error, PostcardService, StampCatalogueService,
    StampCollectionService, StampRequestService, Username,
};
use postcards::inbound::http::state::{HttpState, HttpStatePorts};
use postcards::outbound::memory::InMemoryStore;
use postcards::outbound::password::Argon2PasswordHasher;
use postcards::outbound::persistence::{
    DbPool, DieselContactRepository, DieselPostcardRepository, DieselStampCollectionRepository,
    DieselStampRepository, DieselStampRequestRepository, DieselUserRepository,
};

/// Storage backend chosen at startup.
pub enum Storage {
    Postgres(DbPool),
    Memory(InMemoryStore),
}

/// Options applied while wiring the HTTP state.
pub struct WiringOptions<'a> {
    pub clock: Arc<dyn Clock>,
    pub admin: Option<(&'a str, &'a str)>,
    pub cron_token: Option<&'a str>,
}

struct Repositories<U, P, C, S, Q, L> {
    users: Arc<U>,
    postcards: Arc<P>,
    contacts: Arc<C>,
    stamps: Arc<S>,
    requests: Arc<Q>,
    ledger: Arc<L>,
}

/// Build services over `storage`, bootstrap the admin account, and return
/// the state handed to every worker.
///
/// # Errors
/// Fails when the admin account cannot be ensured.
pub async fn build_http_state(
    storage: Storage,
    options: WiringOptions<'_>,
) -> Result<HttpState, Error> {
    match storage {
        Storage::Postgres(pool) => {
            wire(
                Repositories {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    postcards: Arc::new(DieselPostcardRepository::new(pool.clone())),
                    contacts: Arc::new(DieselContactRepository::new(pool.clone())),
                    stamps: Arc::new(DieselStampRepository::new(pool.clone())),
                    requests: Arc::new(DieselStampRequestRepository::new(pool.clone())),
                    ledger: Arc::new(DieselStampCollectionRepository::new(pool)),
                },
                options,
            )
            .await
        }
        Storage::Memory(store) => {
            warn!("no database configured; state is held in memory and lost on restart");
            let store = Arc::new(store);
            wire(
                Repositories {
                    users: store.clone(),
                    postcards: store.clone(),
                    contacts: store.clone(),
                    stamps: store.clone(),
                    requests: store.clone(),
                    ledger: store,
                },
                options,
            )
            .await
        }
    }
}

async fn wire<U, P, C, S, Q, L>(
    repos: Repositories<U, P, C, S, Q, L>,
    options: WiringOptions<'_>,
) -> Result<HttpState, Error>
where
    U: UserRepository + 'static,
    P: PostcardRepository + 'static,
    C: ContactRepository + 'static,
    S: StampRepository + 'static,
    Q: StampRequestRepository + 'static,
    L: StampCollectionRepository + 'static,
{
    let WiringOptions {
        clock,
        admin,
        cron_token,
    } = options;
    let accounts = Arc::new(AccountService::new(
        repos.users,
        Arc::new(Argon2PasswordHasher::new()),
        clock.clone(),
    ));
    if let Some((username, password)) = admin {
        let username = Username::new(username)
            .map_err(|err| Error::invalid_request(format!("admin username: {err}")))?;
        let admin = accounts.ensure_admin(username, password).await?;
        info!(user_id = %admin.id(), "admin account ready");
    }

    let postcards = Arc::new(PostcardService::new(
        repos.postcards.clone(),
        repos.contacts,
        clock.clone(),
    ));
    let sweep = Arc::new(DeliverySweepService::new(repos.postcards, clock.clone()));
    let catalogue = Arc::new(StampCatalogueService::new(
        repos.stamps,
        repos.requests.clone(),
        clock.clone(),
    ));
    let requests = Arc::new(StampRequestService::new(repos.requests, clock.clone()));
    let collection = Arc::new(StampCollectionService::new(repos.ledger, clock));

    Ok(HttpState::new(
        HttpStatePorts {
            accounts: accounts.clone(),
            account_query: accounts,
            postcards: postcards.clone(),
            postcard_query: postcards,
            sweep,
            catalogue: catalogue.clone(),
            catalogue_query: catalogue,
            requests: requests.clone(),
            request_query: requests,
            collection: collection.clone(),
            collection_query: collection,
        },
        cron_token,
    ))
}
