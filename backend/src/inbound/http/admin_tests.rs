//! Tests for admin handlers.

use super::*;
use crate::domain::{StampId, StampOrigin, StampPrompt, StampRequestStatus, UserId};
use crate::inbound::http::test_utils::{
    MockPorts, admin, cookie_for, json_body, member, test_app,
};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).single().expect("instant")
}

fn owl_body() -> serde_json::Value {
    json!({ "name": "Mossy owl", "image": "https://cdn.example.com/owl.png" })
}

fn pending(id: StampRequestId) -> StampRequest {
    StampRequest::submit(
        id,
        StampPrompt::new("an owl wearing a moss scarf").expect("prompt"),
        UserId::random(),
        now(),
    )
}

#[rstest]
#[case("/api/v1/admin/stamps", false)]
#[case("/api/v1/admin/stamp-requests", false)]
#[case("/api/v1/admin/stamps", true)]
#[case("/api/v1/admin/stamp-requests", true)]
#[actix_web::test]
async fn admin_routes_reject_non_admins(#[case] uri: &str, #[case] signed_in: bool) {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
    let mut req = actix_test::TestRequest::get().uri(uri);
    if signed_in {
        req = req.cookie(cookie_for(&app, &member()).await);
    }

    let res = actix_test::call_service(&app, req.to_request()).await;
    let expected = if signed_in {
        StatusCode::FORBIDDEN
    } else {
        StatusCode::UNAUTHORIZED
    };
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn demoted_admin_is_forbidden_despite_their_cookie() {
    let ports = MockPorts::default().with_admin_revoked();
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::get()
        .uri("/api/v1/admin/stamps")
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn create_stamp_is_direct_and_unapproved() {
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_create_stamp()
        .times(1)
        .returning(|_, draft| Ok(draft.into_direct(StampId::random(), now())));
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/admin/stamps")
        .cookie(cookie)
        .set_json(owl_body())
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let value = json_body(res).await;
    assert_eq!(value["approved"], false);
    assert!(value.get("origin").is_none());
}

#[rstest]
#[case(json!({ "image": "https://cdn.example.com/owl.png" }), "name")]
#[case(json!({ "name": "Owl" }), "image")]
#[case(json!({ "name": "Owl", "image": "owl.png" }), "image")]
#[case(json!({ "name": "x".repeat(101), "image": "https://cdn.example.com/owl.png" }), "name")]
#[case(json!({ "name": "Owl", "description": "d".repeat(1001), "image": "https://cdn.example.com/owl.png" }), "description")]
#[actix_web::test]
async fn create_stamp_validates_body(#[case] body: serde_json::Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/admin/stamps")
        .cookie(cookie)
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["details"]["field"], field);
}

#[actix_web::test]
async fn approve_flips_request_only() {
    let id = StampRequestId::from_uuid(Uuid::new_v4());
    let mut ports = MockPorts::default();
    ports
        .requests
        .expect_approve()
        .withf(move |_, request_id| request_id == &id)
        .times(1)
        .returning(|_, request_id| {
            let mut request = pending(*request_id);
            request.status = StampRequestStatus::Approved;
            Ok(request)
        });
    ports.catalogue.expect_create_stamp_from_request().never();
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/admin/stamp-requests/{id}/approve"))
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let value = json_body(res).await;
    assert_eq!(value["status"], "approved");
    assert!(value.get("stampId").is_none());
}

#[rstest]
#[case(Error::not_found("stamp request not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("stamp request is not pending"), StatusCode::CONFLICT)]
#[actix_web::test]
async fn reject_surfaces_service_failures(#[case] error: Error, #[case] expected: StatusCode) {
    let mut ports = MockPorts::default();
    ports
        .requests
        .expect_reject()
        .times(1)
        .returning(move |_, _| Err(error.clone()));
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/admin/stamp-requests/{}/reject", Uuid::new_v4()))
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn promote_returns_stamp_and_request() {
    let mut ports = MockPorts::default();
    ports
        .catalogue
        .expect_create_stamp_from_request()
        .times(1)
        .returning(|_, request_id, draft| {
            let mut request = pending(*request_id);
            let origin = StampOrigin {
                request_id: request.id,
                prompt: request.prompt.as_ref().to_owned(),
                submitted_by: request.submitted_by,
            };
            let stamp = draft.into_promoted(StampId::random(), origin, now());
            request.status = StampRequestStatus::Approved;
            request.stamp_id = Some(stamp.id);
            Ok(StampPromotion { stamp, request })
        });
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/admin/stamp-requests/{}/stamp", Uuid::new_v4()))
        .cookie(cookie)
        .set_json(owl_body())
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let value = json_body(res).await;
    assert_eq!(value["stamp"]["approved"], true);
    assert_eq!(value["request"]["status"], "approved");
    assert_eq!(value["request"]["stampId"], value["stamp"]["id"]);
}

#[actix_web::test]
async fn malformed_request_id_is_bad_request() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
    let cookie = cookie_for(&app, &admin()).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/admin/stamp-requests/42/approve")
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
