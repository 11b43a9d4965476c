//! Account handlers: sign-up, session login/logout, profile and search.
//!
//! ```text
//! POST /api/v1/users  {"username":"alice","email":"alice@example.com","password":"hunter22!"}
//! POST /api/v1/login  {"username":"alice","password":"hunter22!"}
//! GET  /api/v1/users/search?q=bo
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ApiResult, CredentialsValidationError, Error, LoginCredentials, NewAccount, User, UserSummary,
    UserValidationError,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, require};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Query string for `GET /users/search`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring of the username.
    pub q: Option<String>,
}

fn credentials_error(error: CredentialsValidationError) -> Error {
    let field = match &error {
        CredentialsValidationError::EmptyUsername => USERNAME,
        CredentialsValidationError::EmptyPassword
        | CredentialsValidationError::PasswordTooShort { .. } => PASSWORD,
        CredentialsValidationError::User(UserValidationError::InvalidEmail) => EMAIL,
        CredentialsValidationError::User(_) => USERNAME,
    };
    invalid_field(field, error)
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "signUp",
    security([])
)]
#[post("/users")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<SignUpRequest>,
) -> ApiResult<HttpResponse> {
    let SignUpRequest {
        username,
        email,
        password,
    } = payload.into_inner();
    let username = require(username, USERNAME)?;
    let email = require(email, EMAIL)?;
    let password = require(password, PASSWORD)?;
    let account =
        NewAccount::try_from_parts(&username, &email, &password).map_err(credentials_error)?;

    let user = state.accounts.sign_up(account).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        &require(username, USERNAME)?,
        &require(password, PASSWORD)?,
    )
    .map_err(credentials_error)?;

    let identity = state.accounts.log_in(&credentials).await?;
    session.persist_identity(&identity)?;
    let user = state.account_query.current_user(&identity).await?;
    Ok(web::Json(user))
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Profile of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let identity = session.require_identity()?;
    let user = state.account_query.current_user(&identity).await?;
    Ok(web::Json(user))
}

/// Find other users by username.
#[utoipa::path(
    get,
    path = "/api/v1/users/search",
    params(SearchParams),
    responses(
        (status = 200, description = "At most ten matches ordered by username", body = [UserSummary]),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
#[get("/users/search")]
pub async fn search_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<Vec<UserSummary>>> {
    let identity = session.require_identity()?;
    let query = params.into_inner().q.unwrap_or_default();
    let found = state.account_query.search(&identity, &query).await?;
    Ok(web::Json(found))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
