//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Error, Identity, Role, UserId};

use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockDeliverySweep, MockPostcardCommand,
    MockPostcardQuery, MockStampCatalogueCommand, MockStampCatalogueQuery,
    MockStampCollectionCommand, MockStampCollectionQuery, MockStampRequestCommand,
    MockStampRequestQuery,
};

use super::session::SessionContext;
use super::state::{HttpState, HttpStatePorts};
use super::{configure_api, extractor_config};

pub(crate) const SESSION_COOKIE: &str = "session";

/// Session middleware with a fresh key and an insecure cookie for plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `res`.
pub(crate) fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Mock ports; tests set the expectations they exercise. Admin sessions are
/// confirmed against the account store, so the default bundle reports every
/// stored account as still holding the admin flag.
pub(crate) struct MockPorts {
    pub accounts: MockAccountCommand,
    pub account_query: MockAccountQuery,
    pub postcards: MockPostcardCommand,
    pub postcard_query: MockPostcardQuery,
    pub sweep: MockDeliverySweep,
    pub catalogue: MockStampCatalogueCommand,
    pub catalogue_query: MockStampCatalogueQuery,
    pub requests: MockStampRequestCommand,
    pub request_query: MockStampRequestQuery,
    pub collection: MockStampCollectionCommand,
    pub collection_query: MockStampCollectionQuery,
}

impl Default for MockPorts {
    fn default() -> Self {
        let mut account_query = MockAccountQuery::new();
        account_query
            .expect_holds_admin_role()
            .times(0..)
            .returning(|_| Ok(true));
        Self {
            accounts: MockAccountCommand::new(),
            account_query,
            postcards: MockPostcardCommand::new(),
            postcard_query: MockPostcardQuery::new(),
            sweep: MockDeliverySweep::new(),
            catalogue: MockStampCatalogueCommand::new(),
            catalogue_query: MockStampCatalogueQuery::new(),
            requests: MockStampRequestCommand::new(),
            request_query: MockStampRequestQuery::new(),
            collection: MockStampCollectionCommand::new(),
            collection_query: MockStampCollectionQuery::new(),
        }
    }
}

impl MockPorts {
    /// Make the account store report that admin sessions were revoked.
    pub(crate) fn with_admin_revoked(mut self) -> Self {
        self.account_query.checkpoint();
        self.account_query
            .expect_holds_admin_role()
            .times(1)
            .returning(|_| Ok(false));
        self
    }

    pub(crate) fn into_state(self, cron_token: Option<&str>) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                accounts: Arc::new(self.accounts),
                account_query: Arc::new(self.account_query),
                postcards: Arc::new(self.postcards),
                postcard_query: Arc::new(self.postcard_query),
                sweep: Arc::new(self.sweep),
                catalogue: Arc::new(self.catalogue),
                catalogue_query: Arc::new(self.catalogue_query),
                requests: Arc::new(self.requests),
                request_query: Arc::new(self.request_query),
                collection: Arc::new(self.collection),
                collection_query: Arc::new(self.collection_query),
            },
            cron_token,
        )
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Impersonation {
    user_id: UserId,
    admin: bool,
}

async fn impersonate(
    session: SessionContext,
    payload: web::Json<Impersonation>,
) -> Result<HttpResponse, Error> {
    let Impersonation { user_id, admin } = payload.into_inner();
    session.persist_identity(&Identity::new(user_id, Role::from_admin_flag(admin)))?;
    Ok(HttpResponse::NoContent().finish())
}

/// Full `/api/v1` surface over `state`, plus a route that forges sessions.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(extractor_config)
        .wrap(test_session_middleware())
        .route("/test/session", web::post().to(impersonate))
        .service(web::scope("/api/v1").configure(configure_api))
}

/// Session cookie for `identity`.
pub(crate) async fn cookie_for<S, B>(app: &S, identity: &Identity) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/test/session")
        .set_json(serde_json::json!({
            "userId": identity.user_id().to_string(),
            "admin": identity.is_admin(),
        }))
        .to_request();
    let res = test::call_service(app, req).await;
    session_cookie(&res)
}

/// Decode a JSON response body.
pub(crate) async fn json_body<B: MessageBody>(res: ServiceResponse<B>) -> Value {
    let bytes = test::read_body(res).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

pub(crate) fn member() -> Identity {
    Identity::member(UserId::random())
}

pub(crate) fn admin() -> Identity {
    Identity::admin(UserId::random())
}
