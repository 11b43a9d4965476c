//! Postcard handlers: send, inbox and contacts.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SendPostcardRequest;
use crate::domain::{
    ApiResult, Contact, Error, MessageText, Postcard, StampId, UserId,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field, parse_uuid, parse_uuid_list, require,
};

const RECIPIENT: FieldName = FieldName::new("recipientId");
const MESSAGE: FieldName = FieldName::new("message");
const STAMPS: FieldName = FieldName::new("stamps");

/// Body for `POST /api/v1/postcards`. The sender is always the caller.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendPostcardBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub recipient_id: Option<String>,
    #[schema(example = "Hello")]
    pub message: Option<String>,
    #[serde(default)]
    pub stamps: Vec<String>,
}

impl TryFrom<SendPostcardBody> for SendPostcardRequest {
    type Error = Error;

    fn try_from(body: SendPostcardBody) -> Result<Self, Self::Error> {
        let recipient = parse_uuid(&require(body.recipient_id, RECIPIENT)?, RECIPIENT)?;
        let message = MessageText::new(require(body.message, MESSAGE)?)
            .map_err(|err| invalid_field(MESSAGE, err))?;
        let stamps = parse_uuid_list(&body.stamps, STAMPS)?
            .into_iter()
            .map(StampId::from_uuid)
            .collect();
        Ok(Self {
            recipient: UserId::from_uuid(recipient),
            message,
            stamps,
        })
    }
}

/// Schedule a postcard for the next 18:30 UTC delivery.
#[utoipa::path(
    post,
    path = "/api/v1/postcards",
    request_body = SendPostcardBody,
    responses(
        (status = 201, description = "Postcard scheduled", body = Postcard),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["postcards"],
    operation_id = "sendPostcard"
)]
#[post("/postcards")]
pub async fn send_postcard(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SendPostcardBody>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let request = SendPostcardRequest::try_from(payload.into_inner())?;
    let postcard = state.postcards.send(&identity, request).await?;
    Ok(HttpResponse::Created().json(postcard))
}

/// Delivered postcards addressed to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/postcards/inbox",
    responses(
        (status = 200, description = "Newest delivery first", body = [Postcard]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["postcards"],
    operation_id = "inbox"
)]
#[get("/postcards/inbox")]
pub async fn inbox(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Postcard>>> {
    let identity = session.require_identity()?;
    Ok(web::Json(state.postcard_query.inbox(&identity).await?))
}

/// Contact rows owned by the caller.
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    responses(
        (status = 200, description = "Most recent exchange first", body = [Contact]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["postcards"],
    operation_id = "contacts"
)]
#[get("/contacts")]
pub async fn contacts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Contact>>> {
    let identity = session.require_identity()?;
    Ok(web::Json(state.postcard_query.contacts(&identity).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostcardDraft, PostcardId};
    use crate::inbound::http::test_utils::{MockPorts, cookie_for, json_body, member, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    fn scheduled(sender: UserId, request: SendPostcardRequest) -> Postcard {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).single().expect("instant");
        PostcardDraft::try_new(sender, request.recipient, request.message, request.stamps)
            .expect("draft")
            .schedule(PostcardId::random(), now)
    }

    #[actix_web::test]
    async fn send_uses_caller_as_sender() {
        let caller = member();
        let caller_id = *caller.user_id();
        let recipient = Uuid::new_v4();
        let mut ports = MockPorts::default();
        ports
            .postcards
            .expect_send()
            .withf(move |identity, request| {
                identity.user_id() == &caller_id
                    && request.recipient.as_uuid() == &recipient
                    && request.message.as_ref() == "Hello"
            })
            .times(1)
            .returning(|identity, request| Ok(scheduled(*identity.user_id(), request)));
        let app = actix_test::init_service(test_app(ports.into_state(None))).await;
        let cookie = cookie_for(&app, &caller).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/postcards")
            .cookie(cookie)
            .set_json(json!({ "recipientId": recipient, "message": "Hello" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let value = json_body(res).await;
        assert_eq!(value["sender"], caller_id.to_string());
        assert_eq!(value["deliveryDate"], "2024-07-01T18:30:00Z");
        assert_eq!(value["delivered"], false);
    }

    #[rstest]
    #[case(json!({ "message": "Hello" }), "recipientId")]
    #[case(json!({ "recipientId": "not-a-uuid", "message": "Hello" }), "recipientId")]
    #[case(json!({ "recipientId": Uuid::nil(), "message": "   " }), "message")]
    #[case(json!({ "recipientId": Uuid::nil(), "message": "x".repeat(2001) }), "message")]
    #[case(json!({ "recipientId": Uuid::nil(), "message": "Hi", "stamps": ["bad"] }), "stamps")]
    #[actix_web::test]
    async fn send_rejects_invalid_bodies(#[case] body: serde_json::Value, #[case] field: &str) {
        let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
        let cookie = cookie_for(&app, &member()).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/postcards")
            .cookie(cookie)
            .set_json(body)
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["details"]["field"], field);
    }

    #[actix_web::test]
    async fn send_without_session_is_unauthorised() {
        let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/v1/postcards")
            .set_json(json!({ "recipientId": Uuid::nil(), "message": "Hello" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn inbox_returns_callers_postcards() {
        let caller = member();
        let mut ports = MockPorts::default();
        ports.postcard_query.expect_inbox().times(1).returning(|identity| {
            let request = SendPostcardRequest {
                recipient: *identity.user_id(),
                message: MessageText::new("Hello").expect("message"),
                stamps: Vec::new(),
            };
            let mut postcard = scheduled(UserId::random(), request);
            postcard.deliver(postcard.delivery_date);
            Ok(vec![postcard])
        });
        let app = actix_test::init_service(test_app(ports.into_state(None))).await;
        let cookie = cookie_for(&app, &caller).await;

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/postcards/inbox")
            .cookie(cookie)
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let value = json_body(res).await;
        assert_eq!(value[0]["delivered"], true);
        assert_eq!(value[0]["recipient"], caller.user_id().to_string());
    }
}
