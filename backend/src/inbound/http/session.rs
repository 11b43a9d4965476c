//! Cookie session wrapper exposing the caller's [`Identity`].
//!
//! Handlers never touch raw session keys. Login persists an identity,
//! protected routes ask for one, and admin routes ask for a capability.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::AccountQuery;
use crate::domain::{AdminCapability, Error, Identity, Role, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ADMIN_KEY: &str = "is_admin";

/// Newtype over the Actix session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store `identity` in the session cookie, rotating the session id.
    pub fn persist_identity(&self, identity: &Identity) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, identity.user_id().to_string())
            .and_then(|()| self.0.insert(ADMIN_KEY, identity.is_admin()))
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Identity stored in the cookie, if any. A tampered id reads as absent.
    pub fn identity(&self) -> Result<Option<Identity>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let user_id = match UserId::new(&raw) {
            Ok(id) => id,
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                return Ok(None);
            }
        };
        let is_admin = self.0.get::<bool>(ADMIN_KEY).ok().flatten().unwrap_or(false);
        Ok(Some(Identity::new(user_id, Role::from_admin_flag(is_admin))))
    }

    /// Authenticated identity or `401 Unauthorized`.
    pub fn require_identity(&self) -> Result<Identity, Error> {
        self.identity()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Admin capability; `401` when anonymous, `403` for regular members.
    pub fn require_admin(&self) -> Result<AdminCapability, Error> {
        self.require_identity()?.require_admin()
    }

    /// Admin capability confirmed against the stored account, so a demoted
    /// admin loses access before their cookie expires. Member sessions are
    /// refused without a lookup.
    pub async fn require_current_admin(
        &self,
        accounts: &dyn AccountQuery,
    ) -> Result<AdminCapability, Error> {
        let identity = self.require_identity()?;
        let capability = identity.require_admin()?;
        if accounts.holds_admin_role(&identity).await? {
            Ok(capability)
        } else {
            warn!(user_id = %identity.user_id(), "admin session for an account without the admin flag");
            Err(Error::forbidden("admin role revoked"))
        }
    }

    /// Drop every session entry and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    const ALICE: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn identity_for(admin: bool) -> Identity {
        let id = UserId::new(ALICE).expect("fixture id");
        Identity::new(id, Role::from_admin_flag(admin))
    }

    async fn login(admin: bool, session: SessionContext) -> Result<HttpResponse, Error> {
        session.persist_identity(&identity_for(admin))?;
        Ok(HttpResponse::Ok().finish())
    }

    #[rstest]
    #[case(false, StatusCode::FORBIDDEN)]
    #[case(true, StatusCode::OK)]
    #[actix_web::test]
    async fn admin_gate_follows_stored_role(#[case] admin: bool, #[case] expected: StatusCode) {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(move |session: SessionContext| login(admin, session)),
                )
                .route(
                    "/admin",
                    web::get().to(|session: SessionContext| async move {
                        let capability = session.require_admin()?;
                        Ok::<_, Error>(HttpResponse::Ok().body(capability.admin_id().to_string()))
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&res);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/admin").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn anonymous_callers_are_unauthorised() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/me",
            web::get().to(|session: SessionContext| async move {
                session.require_identity()?;
                Ok::<_, Error>(HttpResponse::Ok().finish())
            }),
        ))
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_user_id_reads_as_anonymous() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/forge",
                    web::get().to(|session: Session| async move {
                        session
                            .insert(USER_ID_KEY, "not-a-uuid")
                            .expect("insert forged id");
                        HttpResponse::Ok().finish()
                    }),
                )
                .route(
                    "/me",
                    web::get().to(|session: SessionContext| async move {
                        session.require_identity()?;
                        Ok::<_, Error>(HttpResponse::Ok().finish())
                    }),
                ),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/forge").to_request()).await;
        let cookie = session_cookie(&res);
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/me").cookie(cookie).to_request())
                .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
