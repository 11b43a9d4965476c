//! Shared harness for end-to-end HTTP tests over the in-memory adapters.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use postcards::Trace;
use postcards::domain::{
    AccountService, DeliverySweepService, PostcardService, StampCatalogueService,
    StampCollectionService, StampRequestService, Username,
};
use postcards::inbound::http::state::{HttpState, HttpStatePorts};
use postcards::inbound::http::{configure_api, extractor_config};
use postcards::outbound::memory::InMemoryStore;
use postcards::outbound::password::Argon2PasswordHasher;
use postcards::test_support::ManualClock;

pub const CRON_TOKEN: &str = "sweep-token";
pub const ADMIN_USERNAME: &str = "root";
pub const PASSWORD: &str = "correct horse battery";

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, hour, minute, 0)
        .single()
        .expect("valid instant")
}

/// In-memory backend plus a clock the test controls.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub state: HttpState,
}

impl Harness {
    /// Wire every service over one store and bootstrap the admin account.
    pub async fn new(now: DateTime<Utc>) -> Self {
        let clock = Arc::new(ManualClock::new(now));
        let store = Arc::new(InMemoryStore::new());
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            Arc::new(Argon2PasswordHasher::new()),
            clock.clone(),
        ));
        accounts
            .ensure_admin(Username::new(ADMIN_USERNAME).expect("admin name"), PASSWORD)
            .await
            .expect("bootstrap admin");
        let postcards = Arc::new(PostcardService::new(store.clone(), store.clone(), clock.clone()));
        let catalogue = Arc::new(StampCatalogueService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
        ));
        let requests = Arc::new(StampRequestService::new(store.clone(), clock.clone()));
        let collection = Arc::new(StampCollectionService::new(store.clone(), clock.clone()));
        let sweep = Arc::new(DeliverySweepService::new(store, clock.clone()));

        let state = HttpState::new(
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
            Some(CRON_TOKEN),
        );
        Self { clock, state }
    }

    /// Fresh app over the shared state. The returned factory does not borrow
    /// the harness.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_name("session".to_owned())
            .cookie_secure(false)
            .build();
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .configure(extractor_config)
            .wrap(Trace)
            .service(web::scope("/api/v1").wrap(session).configure(configure_api))
    }
}

/// Register `username` and return its id.
pub async fn sign_up<S, B>(app: &S, username: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), 201, "sign-up of {username}");
    read_json(res).await["id"]
        .as_str()
        .expect("user id")
        .to_owned()
}

/// Log in and return the session cookie.
pub async fn log_in<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": username, "password": PASSWORD }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), 200, "login of {username}");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

pub async fn read_json<B: MessageBody>(res: ServiceResponse<B>) -> Value {
    let bytes = test::read_body(res).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}
