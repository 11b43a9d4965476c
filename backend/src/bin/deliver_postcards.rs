//! Run one delivery sweep against PostgreSQL and report the count.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

use postcards::domain::DeliverySweepService;
use postcards::domain::ports::DeliverySweep;
use postcards::outbound::persistence::{
    DbPool, DieselPostcardRepository, PoolConfig, run_pending_migrations,
};

/// `deliver-postcards` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "deliver-postcards",
    about = "Deliver every postcard whose delivery date has passed",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Apply pending migrations before sweeping.
    #[arg(long)]
    migrate: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init();

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    let delivered = runtime.block_on(sweep(args))?;
    println!("delivered={delivered}");
    Ok(())
}

async fn sweep(args: CliArgs) -> Result<u64> {
    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| eyre!("pass --database-url or set DATABASE_URL"))?;

    if args.migrate {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("failed to apply migrations")?;
    }

    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(1))
        .await
        .map_err(|err| eyre!(err.into_message()))?;
    let service = DeliverySweepService::new(
        Arc::new(DieselPostcardRepository::new(pool)),
        Arc::new(DefaultClock),
    );
    let report = service
        .run()
        .await
        .map_err(|err| eyre!("sweep failed: {err}"))?;
    Ok(report.delivered)
}
