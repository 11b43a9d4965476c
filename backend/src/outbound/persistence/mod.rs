//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven repository ports backed by
//! PostgreSQL via `diesel-async` over a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Atomic writes**: postcard sends, stamp promotion, and collection
//!   claims each complete in one statement or one transaction.
//!
//! # Example
//!
//! ```no_run
//! use postcards::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), postcards::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/postcards")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_postcard_repository;
mod diesel_stamp_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_postcard_repository::{DieselContactRepository, DieselPostcardRepository};
pub use diesel_stamp_repository::{
    DieselStampCollectionRepository, DieselStampRepository, DieselStampRequestRepository,
};
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
