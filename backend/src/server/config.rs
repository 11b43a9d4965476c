//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use postcards::inbound::http::session_config::SessionSettings;
use postcards::inbound::http::state::HttpState;

/// Everything [`super::create_server`] needs besides the health state.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    /// Combine session settings, listener address and wired ports.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, http_state: HttpState) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            http_state,
        }
    }
}
