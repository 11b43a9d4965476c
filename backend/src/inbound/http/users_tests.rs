//! Tests for account handlers.

use super::*;
use crate::domain::{EmailAddress, Identity, Role, UserId, Username};
use crate::inbound::http::test_utils::{MockPorts, cookie_for, json_body, member, test_app};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::json;

fn user(id: UserId, username: &str) -> User {
    User::new(
        id,
        Username::new(username).expect("username"),
        EmailAddress::new(format!("{username}@example.com")).expect("email"),
        false,
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).single().expect("instant"),
    )
}

#[rstest]
#[case(json!({ "email": "a@example.com", "password": "hunter22!" }), "username", "missing_field")]
#[case(json!({ "username": "alice", "password": "hunter22!" }), "email", "missing_field")]
#[case(json!({ "username": "alice", "email": "a@example.com", "password": "short" }), "password", "invalid_value")]
#[case(json!({ "username": "a!", "email": "a@example.com", "password": "hunter22!" }), "username", "invalid_value")]
#[case(json!({ "username": "alice", "email": "nope", "password": "hunter22!" }), "email", "invalid_value")]
#[actix_web::test]
async fn sign_up_validates_fields(
    #[case] body: serde_json::Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(body)
        .to_request();

    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let value = json_body(res).await;
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["details"]["field"], field);
    assert_eq!(value["details"]["code"], code);
}

#[actix_web::test]
async fn sign_up_returns_created_user() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_sign_up()
        .withf(|account| account.username().as_ref() == "alice")
        .times(1)
        .returning(|account| {
            Ok(user(UserId::random(), account.username().as_ref()))
        });
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "username": "alice", "email": "alice@example.com", "password": "hunter22!" }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let value = json_body(res).await;
    assert_eq!(value["username"], "alice");
    assert_eq!(value["isAdmin"], false);
    assert!(value.get("passwordHash").is_none());
}

#[actix_web::test]
async fn duplicate_sign_up_is_conflict() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_sign_up()
        .returning(|_| Err(Error::conflict("username already exists")));
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({ "username": "alice", "email": "alice@example.com", "password": "hunter22!" }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_sets_session_used_by_me() {
    let id = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_log_in()
        .returning(move |_| Ok(Identity::new(id, Role::Member)));
    ports
        .account_query
        .expect_current_user()
        .withf(move |identity| identity.user_id() == &id)
        .times(2)
        .returning(move |_| Ok(user(id, "alice")));
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "alice", "password": "hunter22!" }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(|cookie| cookie.into_owned())
        .expect("session cookie");

    let req = actix_test::TestRequest::get()
        .uri("/api/v1/users/me")
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["id"], id.to_string());
}

#[actix_web::test]
async fn wrong_password_is_unauthorised() {
    let mut ports = MockPorts::default();
    ports
        .accounts
        .expect_log_in()
        .returning(|_| Err(Error::unauthorized("invalid credentials")));
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": "alice", "password": "wrong-password" }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["message"], "invalid credentials");
}

#[actix_web::test]
async fn me_without_session_is_unauthorised() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
    let req = actix_test::TestRequest::get().uri("/api/v1/users/me").to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn search_passes_query_for_caller() {
    let caller = member();
    let caller_id = *caller.user_id();
    let mut ports = MockPorts::default();
    ports
        .account_query
        .expect_search()
        .withf(move |identity, query| identity.user_id() == &caller_id && query == "bo")
        .times(1)
        .returning(|_, _| Ok(vec![user(UserId::random(), "bob").summary()]));
    let app = actix_test::init_service(test_app(ports.into_state(None))).await;
    let cookie = cookie_for(&app, &caller).await;

    let req = actix_test::TestRequest::get()
        .uri("/api/v1/users/search?q=bo")
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let value = json_body(res).await;
    assert_eq!(value[0]["username"], "bob");
}

#[actix_web::test]
async fn logout_clears_session() {
    let app = actix_test::init_service(test_app(MockPorts::default().into_state(None))).await;
    let cookie = cookie_for(&app, &member()).await;

    let req = actix_test::TestRequest::post()
        .uri("/api/v1/logout")
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("removal cookie");
    assert_eq!(cleared.value(), "");
}
