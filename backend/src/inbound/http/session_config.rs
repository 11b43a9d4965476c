//! Session cookie configuration read from the environment.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds refuse to start unless every toggle is explicit and valid.
//!
//! | Variable                  | Meaning                                   |
//! |---------------------------|-------------------------------------------|
//! | `SESSION_KEY_FILE`        | Path to at least 64 bytes of key material |
//! | `SESSION_COOKIE_SECURE`   | Mark the cookie `Secure`                  |
//! | `SESSION_SAMESITE`        | `Strict`, `Lax` or `None`                 |
//! | `SESSION_ALLOW_EPHEMERAL` | Generate a throwaway key if the file is missing |

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::{info, warn};
use zeroize::Zeroize;

use super::secrets::key_fingerprint;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults are tolerated with a warning.
    Debug,
    /// Every toggle must be explicit and valid.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated cookie session settings.
pub struct SessionSettings {
    /// Signing and encryption key.
    pub key: Key,
    /// Whether the cookie is marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

/// Why the session cookie could not be configured.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Release builds need every toggle set explicitly.
    #[error("{name} must be set")]
    MissingEnv { name: &'static str },
    /// The toggle is set to something unrecognised.
    #[error("{name}={value:?} is not one of {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The key file exists but cannot be read, or is absent in release.
    #[error("session key {path:?} unreadable: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Release builds need at least `min_len` bytes of key material.
    #[error("session key {path:?} holds {length} bytes, {min_len} required")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Browsers drop `SameSite=None` cookies that are not `Secure`.
    #[error("SESSION_SAMESITE=None needs SESSION_COOKIE_SECURE enabled")]
    InsecureSameSiteNone,
    /// Throwaway keys would log every user out on restart.
    #[error("SESSION_ALLOW_EPHEMERAL is only honoured in debug builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// # Errors
/// Returns [`SessionConfigError`] in release mode when a toggle is missing or
/// invalid, or when the key file is unreadable or too short.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = bool_toggle(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = bool_toggle(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key(env, mode, allow_ephemeral)?;
    info!(fingerprint = %key_fingerprint(&key), "session key loaded");

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Use `fallback` in debug builds, fail with `error` in release builds.
fn tolerate<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "session configuration defaulted");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn bool_toggle<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default_value: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        return tolerate(mode, default_value, SessionConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => tolerate(
            mode,
            default_value,
            SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        return tolerate(
            mode,
            default_same_site,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
        );
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => tolerate(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => tolerate(
            mode,
            default_same_site,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = env
        .string(KEY_FILE_ENV)
        .map_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH), PathBuf::from);
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "session key missing; generated a temporary one");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };
    let length = bytes.len();
    let result = if length < SESSION_KEY_MIN_LEN {
        tolerate(
            mode,
            Key::generate(),
            SessionConfigError::KeyTooShort {
                path,
                length,
                min_len: SESSION_KEY_MIN_LEN,
            },
        )
    } else {
        Ok(Key::derive_from(&bytes))
    };
    bytes.zeroize();
    result
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
