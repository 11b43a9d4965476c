//! Port for one-way password hashing.
//!
//! Hashing is CPU-bound and synchronous; adapters must not block on I/O.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hash computation failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// Stored hash could not be decoded.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Port for producing and checking password hashes.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a clear-text password with a fresh salt.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against `hash`. A mismatch is `Ok(false)`.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}
