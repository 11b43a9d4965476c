//! Application settings loaded via OrthoConfig.
//!
//! Values come from `POSTCARDS_*` environment variables, an optional config
//! file, and command-line flags, in that order of increasing precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Process-wide settings for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POSTCARDS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory storage is used when absent.
    pub database_url: Option<String>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// Username of the bootstrap admin account.
    pub admin_username: Option<String>,
    /// Password of the bootstrap admin account.
    pub admin_password: Option<String>,
    /// Shared secret accepted by the delivery sweep endpoint.
    pub cron_token: Option<String>,
    /// Upper bound for pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl AppSettings {
    /// Parsed bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns the parse error when the configured address is malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Configured pool size, falling back to ten connections.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Admin credentials when both halves are configured and non-blank.
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        let username = self.admin_username.as_deref()?.trim();
        let password = self.admin_password.as_deref()?;
        (!username.is_empty() && !password.is_empty()).then_some((username, password))
    }

    /// Cron token when configured and non-blank.
    pub fn cron_token(&self) -> Option<&str> {
        self.cron_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "POSTCARDS_BIND_ADDR",
        "POSTCARDS_DATABASE_URL",
        "POSTCARDS_RUN_MIGRATIONS",
        "POSTCARDS_ADMIN_USERNAME",
        "POSTCARDS_ADMIN_PASSWORD",
        "POSTCARDS_CRON_TOKEN",
        "POSTCARDS_DB_MAX_CONNECTIONS",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("postcards")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert!(!settings.run_migrations);
        assert!(settings.admin_credentials().is_none());
        assert!(settings.cron_token().is_none());
        assert_eq!(settings.db_max_connections(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        vars.extend([
            ("POSTCARDS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "POSTCARDS_DATABASE_URL",
                Some("postgres://localhost/postcards".to_owned()),
            ),
            ("POSTCARDS_RUN_MIGRATIONS", Some("true".to_owned())),
            ("POSTCARDS_ADMIN_USERNAME", Some("warden".to_owned())),
            ("POSTCARDS_ADMIN_PASSWORD", Some("letmein-please".to_owned())),
            ("POSTCARDS_CRON_TOKEN", Some("tick".to_owned())),
            ("POSTCARDS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("parses"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/postcards")
        );
        assert!(settings.run_migrations);
        assert_eq!(
            settings.admin_credentials(),
            Some(("warden", "letmein-please"))
        );
        assert_eq!(settings.cron_token(), Some("tick"));
        assert_eq!(settings.db_max_connections(), 4);
    }

    #[rstest]
    fn blank_secrets_are_ignored() {
        let mut vars = cleared();
        vars.extend([
            ("POSTCARDS_ADMIN_USERNAME", Some("   ".to_owned())),
            ("POSTCARDS_ADMIN_PASSWORD", Some("secret-pass".to_owned())),
            ("POSTCARDS_CRON_TOKEN", Some(" ".to_owned())),
        ]);
        let _guard = lock_env(vars);

        let settings = load();
        assert!(settings.admin_credentials().is_none());
        assert!(settings.cron_token().is_none());
    }
}
