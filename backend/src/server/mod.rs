//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
pub mod state_builders;

pub use config::ServerConfig;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite, time::Duration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use postcards::Trace;
#[cfg(debug_assertions)]
use postcards::doc::ApiDoc;
use postcards::inbound::http::health::{HealthState, live, ready};
use postcards::inbound::http::state::HttpState;
use postcards::inbound::http::{configure_api, extractor_config};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(Duration::hours(SESSION_TTL_HOURS)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(extractor_config)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and start serving.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or registering
/// metrics fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        http_state,
    } = config;
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();

    #[cfg(feature = "metrics")]
    let request_metrics = metrics::request_metrics()?;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(request_metrics.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
