//! Admin handlers for the stamp catalogue and the request queue.
//!
//! Every route demands an admin session: anonymous callers get 401, members
//! get 403. The two approval paths stay separate: `approve` only flips the
//! request, `stamp` creates an approved stamp and approves the request with a
//! back-reference in one step.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::StampPromotion;
use crate::domain::{
    ApiResult, Error, ImageRef, Stamp, StampDraft, StampRequest, StampRequestId,
    StampValidationError,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid, require};

const NAME: FieldName = FieldName::new("name");
const DESCRIPTION: FieldName = FieldName::new("description");
const IMAGE: FieldName = FieldName::new("image");
const REQUEST_ID: FieldName = FieldName::new("requestId");

/// Stamp content supplied by an admin.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StampBody {
    #[schema(example = "Mossy owl")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[schema(example = "https://cdn.example.com/owl.png")]
    pub image: Option<String>,
}

impl TryFrom<StampBody> for StampDraft {
    type Error = Error;

    fn try_from(body: StampBody) -> Result<Self, Self::Error> {
        let name = require(body.name, NAME)?;
        let image =
            ImageRef::new(require(body.image, IMAGE)?).map_err(|err| invalid_field(IMAGE, err))?;
        StampDraft::try_new(&name, &body.description, image).map_err(|err| {
            let field = match err {
                StampValidationError::DescriptionTooLong { .. } => DESCRIPTION,
                StampValidationError::InvalidImage => IMAGE,
                _ => NAME,
            };
            invalid_field(field, err)
        })
    }
}

/// Result of promoting a request into a stamp.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromotionResponse {
    pub stamp: Stamp,
    pub request: StampRequest,
}

impl From<StampPromotion> for PromotionResponse {
    fn from(value: StampPromotion) -> Self {
        Self {
            stamp: value.stamp,
            request: value.request,
        }
    }
}

fn request_id(raw: String) -> Result<StampRequestId, Error> {
    parse_uuid(&raw, REQUEST_ID).map(StampRequestId::from_uuid)
}

/// Every stamp in the catalogue, approved or not.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stamps",
    responses(
        (status = 200, description = "All stamps, newest first", body = [Stamp]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listAllStamps"
)]
#[get("/admin/stamps")]
pub async fn list_stamps(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Stamp>>> {
    let admin = session
        .require_current_admin(state.account_query.as_ref())
        .await?;
    Ok(web::Json(state.catalogue_query.all_stamps(&admin).await?))
}

/// Create a stamp outside the request queue. It starts unapproved.
#[utoipa::path(
    post,
    path = "/api/v1/admin/stamps",
    request_body = StampBody,
    responses(
        (status = 201, description = "Stamp created", body = Stamp),
        (status = 400, description = "Invalid stamp", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createStamp"
)]
#[post("/admin/stamps")]
pub async fn create_stamp(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StampBody>,
) -> ApiResult<HttpResponse> {
    let admin = session
        .require_current_admin(state.account_query.as_ref())
        .await?;
    let draft = StampDraft::try_from(payload.into_inner())?;
    let stamp = state.catalogue.create_stamp(&admin, draft).await?;
    Ok(HttpResponse::Created().json(stamp))
}

/// Requests awaiting a decision.
#[utoipa::path(
    get,
    path = "/api/v1/admin/stamp-requests",
    responses(
        (status = 200, description = "Pending requests, newest first", body = [StampRequest]),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listPendingStampRequests"
)]
#[get("/admin/stamp-requests")]
pub async fn pending_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<StampRequest>>> {
    let admin = session
        .require_current_admin(state.account_query.as_ref())
        .await?;
    Ok(web::Json(state.request_query.pending(&admin).await?))
}

/// Mark a pending request approved without creating a stamp.
#[utoipa::path(
    post,
    path = "/api/v1/admin/stamp-requests/{id}/approve",
    params(("id" = String, Path, description = "Stamp request identifier")),
    responses(
        (status = 200, description = "Request approved", body = StampRequest),
        (status = 404, description = "No such request", body = Error),
        (status = 409, description = "Request already decided", body = Error)
    ),
    tags = ["admin"],
    operation_id = "approveStampRequest"
)]
#[post("/admin/stamp-requests/{id}/approve")]
pub async fn approve_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<StampRequest>> {
    let admin = session
        .require_current_admin(state.account_query.as_ref())
        .await?;
    let id = request_id(path.into_inner())?;
    Ok(web::Json(state.requests.approve(&admin, &id).await?))
}

/// Mark a pending request rejected.
#[utoipa::path(
    post,
    path = "/api/v1/admin/stamp-requests/{id}/reject",
    params(("id" = String, Path, description = "Stamp request identifier")),
    responses(
        (status = 200, description = "Request rejected", body = StampRequest),
        (status = 404, description = "No such request", body = Error),
        (status = 409, description = "Request already decided", body = Error)
    ),
    tags = ["admin"],
    operation_id = "rejectStampRequest"
)]
#[post("/admin/stamp-requests/{id}/reject")]
pub async fn reject_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<StampRequest>> {
    let admin = session
        .require_current_admin(state.account_query.as_ref())
        .await?;
    let id = request_id(path.into_inner())?;
    Ok(web::Json(state.requests.reject(&admin, &id).await?))
}

/// Create an approved stamp from a pending request.
#[utoipa::path(
    post,
    path = "/api/v1/admin/stamp-requests/{id}/stamp",
    params(("id" = String, Path, description = "Stamp request identifier")),
    request_body = StampBody,
    responses(
        (status = 201, description = "Stamp created and request approved", body = PromotionResponse),
        (status = 400, description = "Invalid stamp", body = Error),
        (status = 404, description = "No such request", body = Error),
        (status = 409, description = "Request already decided", body = Error)
    ),
    tags = ["admin"],
    operation_id = "createStampFromRequest"
)]
#[post("/admin/stamp-requests/{id}/stamp")]
pub async fn promote_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<StampBody>,
) -> ApiResult<HttpResponse> {
    let admin = session
        .require_current_admin(state.account_query.as_ref())
        .await?;
    let id = request_id(path.into_inner())?;
    let draft = StampDraft::try_from(payload.into_inner())?;
    let promotion = state
        .catalogue
        .create_stamp_from_request(&admin, &id, draft)
        .await?;
    Ok(HttpResponse::Created().json(PromotionResponse::from(promotion)))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
