//! OpenAPI document for the REST surface.
//!
//! Served by Swagger UI at `/docs` in debug builds and printed by the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::DeliverySweepReport;
use crate::domain::{
    CollectedStamp, CollectionEntry, Contact, Error, ErrorCode, Postcard, Stamp, StampOrigin,
    StampRequest, StampRequestStatus, User, UserSummary,
};
use crate::inbound::http::admin::{PromotionResponse, StampBody};
use crate::inbound::http::postcards::SendPostcardBody;
use crate::inbound::http::stamps::StampRequestBody;
use crate::inbound::http::users::{LoginRequest, SignUpRequest};

/// Registers the session cookie and the sweep bearer token.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
        components.add_security_scheme(
            "CronToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Token configured as POSTCARDS_CRON_TOKEN."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Postcards API",
        description = "Delayed postcards between users, contacts and a stamp catalogue."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::search_users,
        crate::inbound::http::postcards::send_postcard,
        crate::inbound::http::postcards::inbox,
        crate::inbound::http::postcards::contacts,
        crate::inbound::http::stamps::shop,
        crate::inbound::http::stamps::collected,
        crate::inbound::http::stamps::collect,
        crate::inbound::http::stamps::submit_request,
        crate::inbound::http::admin::list_stamps,
        crate::inbound::http::admin::create_stamp,
        crate::inbound::http::admin::pending_requests,
        crate::inbound::http::admin::approve_request,
        crate::inbound::http::admin::reject_request,
        crate::inbound::http::admin::promote_request,
        crate::inbound::http::deliveries::run_sweep,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        UserSummary,
        SignUpRequest,
        LoginRequest,
        Postcard,
        SendPostcardBody,
        Contact,
        Stamp,
        StampOrigin,
        StampBody,
        StampRequest,
        StampRequestStatus,
        StampRequestBody,
        PromotionResponse,
        CollectionEntry,
        CollectedStamp,
        DeliverySweepReport,
    )),
    tags(
        (name = "users", description = "Accounts and sessions"),
        (name = "postcards", description = "Sending and receiving postcards"),
        (name = "stamps", description = "Stamp shop, collection and requests"),
        (name = "admin", description = "Catalogue administration"),
        (name = "deliveries", description = "Delivery sweep"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
