//! Delivery sweep trigger.
//!
//! The sweep is normally driven by an external scheduler presenting the
//! configured cron token as a bearer credential. Admins may also trigger it
//! from a session.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, post, web};
use tracing::info;

use crate::domain::ports::DeliverySweepReport;
use crate::domain::{ApiResult, Error};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
}

async fn authorise(
    req: &HttpRequest,
    state: &HttpState,
    session: &SessionContext,
) -> Result<(), Error> {
    if let Some(token) = bearer_token(req) {
        return match &state.cron_token {
            Some(digest) if digest.matches(token) => Ok(()),
            _ => Err(Error::unauthorized("invalid sweep token")),
        };
    }
    session
        .require_current_admin(state.account_query.as_ref())
        .await
        .map(drop)
}

/// Deliver every postcard whose delivery date has passed.
#[utoipa::path(
    post,
    path = "/api/v1/deliveries/sweep",
    responses(
        (status = 200, description = "Sweep finished", body = DeliverySweepReport),
        (status = 401, description = "Missing or invalid credentials", body = Error),
        (status = 403, description = "Session is not an admin", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["deliveries"],
    operation_id = "runDeliverySweep",
    security(("CronToken" = []), ("SessionCookie" = []))
)]
#[post("/deliveries/sweep")]
pub async fn run_sweep(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DeliverySweepReport>> {
    authorise(&req, &state, &session).await?;
    let report = state.sweep.run().await?;
    info!(delivered = report.delivered, "delivery sweep triggered over HTTP");
    Ok(web::Json(report))
}
