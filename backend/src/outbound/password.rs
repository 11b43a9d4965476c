//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are stored as PHC strings, so parameters and salt travel with the
//! hash and older hashes keep verifying after parameter changes.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use rand::rngs::OsRng;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Hasher using Argon2id v19 defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|phc| PasswordHash::from_encoded(phc.to_string()))
            .map_err(|err| PasswordHasherError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = PhcHash::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hash(err.to_string())),
        }
    }
}
