//! Postcards server entry point: loads settings, wires adapters, serves HTTP.

mod server;

use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use postcards::inbound::http::health::HealthState;
use postcards::inbound::http::session_config::{BuildMode, session_settings_from_env};
use postcards::outbound::memory::InMemoryStore;
use postcards::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use postcards::settings::AppSettings;
use server::state_builders::{Storage, WiringOptions, build_http_state};
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| std::io::Error::other(format!("invalid configuration: {err}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|err| std::io::Error::other(format!("invalid bind address: {err}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let storage = open_storage(&settings).await?;
    let http_state = build_http_state(
        storage,
        WiringOptions {
            clock: Arc::new(DefaultClock),
            admin: settings.admin_credentials(),
            cron_token: settings.cron_token(),
        },
    )
    .await
    .map_err(|err| std::io::Error::other(format!("startup failed: {err}")))?;
    if settings.cron_token().is_none() {
        info!("no cron token configured; only admin sessions can trigger sweeps");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(session, bind_addr, http_state),
    )?;
    info!(%bind_addr, "listening");
    let result = server.await;
    health_state.mark_draining();
    result
}

async fn open_storage(settings: &AppSettings) -> std::io::Result<Storage> {
    let database_url = settings
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty());
    let Some(database_url) = database_url else {
        return Ok(Storage::Memory(InMemoryStore::new()));
    };

    if settings.run_migrations {
        run_pending_migrations(&database_url)
            .await
            .map_err(std::io::Error::other)?;
    }
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(|err| std::io::Error::other(err.into_message()))?;
    Ok(Storage::Postgres(pool))
}
