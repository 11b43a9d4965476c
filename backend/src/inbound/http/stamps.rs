//! Member-facing stamp handlers: shop, collection and stamp requests.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ApiResult, CollectedStamp, CollectionEntry, Error, Stamp, StampId, StampPrompt, StampRequest,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_uuid, require};

const STAMP_ID: FieldName = FieldName::new("stampId");
const PROMPT: FieldName = FieldName::new("prompt");

/// Body for `POST /api/v1/stamp-requests`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StampRequestBody {
    #[schema(example = "an owl wearing a moss scarf")]
    pub prompt: Option<String>,
}

/// Approved stamps available to collect.
#[utoipa::path(
    get,
    path = "/api/v1/stamps/shop",
    responses(
        (status = 200, description = "Approved stamps, newest first", body = [Stamp]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["stamps"],
    operation_id = "stampShop"
)]
#[get("/stamps/shop")]
pub async fn shop(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Stamp>>> {
    let identity = session.require_identity()?;
    Ok(web::Json(state.catalogue_query.shop(&identity).await?))
}

/// Stamps the caller has collected.
#[utoipa::path(
    get,
    path = "/api/v1/stamps/collected",
    responses(
        (status = 200, description = "Most recent claim first", body = [CollectedStamp]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["stamps"],
    operation_id = "collectedStamps"
)]
#[get("/stamps/collected")]
pub async fn collected(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CollectedStamp>>> {
    let identity = session.require_identity()?;
    Ok(web::Json(state.collection_query.collected(&identity).await?))
}

/// Claim a stamp. Each user may collect a stamp once.
#[utoipa::path(
    post,
    path = "/api/v1/stamps/{id}/collect",
    params(("id" = String, Path, description = "Stamp identifier")),
    responses(
        (status = 201, description = "Stamp collected", body = CollectionEntry),
        (status = 400, description = "Invalid stamp id", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Already collected", body = Error)
    ),
    tags = ["stamps"],
    operation_id = "collectStamp"
)]
#[post("/stamps/{id}/collect")]
pub async fn collect(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let stamp_id = StampId::from_uuid(parse_uuid(&path.into_inner(), STAMP_ID)?);
    let entry = state.collection.collect(&identity, &stamp_id).await?;
    Ok(HttpResponse::Created().json(entry))
}

/// Suggest a new stamp for admin review.
#[utoipa::path(
    post,
    path = "/api/v1/stamp-requests",
    request_body = StampRequestBody,
    responses(
        (status = 201, description = "Request queued as pending", body = StampRequest),
        (status = 400, description = "Invalid prompt", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["stamps"],
    operation_id = "submitStampRequest"
)]
#[post("/stamp-requests")]
pub async fn submit_request(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StampRequestBody>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let prompt = StampPrompt::new(require(payload.into_inner().prompt, PROMPT)?)
        .map_err(|err| invalid_field(PROMPT, err))?;
    let request = state.requests.submit(&identity, prompt).await?;
    Ok(HttpResponse::Created().json(request))
}
