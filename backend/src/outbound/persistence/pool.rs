//! Shared `bb8` pool of `diesel-async` PostgreSQL connections.
//!
//! Every repository holds a clone of one [`DbPool`]. Checkouts wait at most
//! [`CHECKOUT_TIMEOUT`] before failing with [`PoolError::Checkout`], which the
//! repositories report as a connection failure.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Connections kept when none is requested explicitly.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Longest wait for a free connection.
pub const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);
const WARM_CONNECTIONS: u32 = 2;

/// Pool construction or checkout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available.
    #[error("database connection unavailable: {message}")]
    Checkout { message: String },
    /// The pool could not be created, usually a malformed URL.
    #[error("database pool setup failed: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Checkout failure carrying the driver's message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Driver message without the variant prefix, for mapping into port
    /// errors that add their own.
    pub fn into_message(self) -> String {
        match self {
            Self::Checkout { message } | Self::Build { message } => message,
        }
    }
}

/// Where to connect and how many connections to keep.
///
/// ```
/// use postcards::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/postcards").with_max_size(0);
/// assert_eq!(config.max_size(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
}

impl PoolConfig {
    /// Pool of [`DEFAULT_MAX_CONNECTIONS`] connections to `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Cap the pool at `max_size` connections, never fewer than one.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Upper bound on open connections.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    fn warm_connections(&self) -> u32 {
        WARM_CONNECTIONS.min(self.max_size)
    }
}

/// Cloneable handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Create the pool. Connections open lazily, so an unreachable server
    /// surfaces on first checkout rather than here.
    ///
    /// # Errors
    /// [`PoolError::Build`] when `bb8` rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.as_str());
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.warm_connections()))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map_err(|err| PoolError::Build {
                message: err.to_string(),
            })?;
        Ok(Self { inner })
    }

    /// Borrow a connection for one unit of work.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] after [`CHECKOUT_TIMEOUT`] or when the server
    /// refuses the connection.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
