//! Fingerprints and constant-time comparison for shared secrets.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Short, non-reversible identifier for a session key, safe to log.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.master());
    hex::encode(&digest[..8])
}

/// SHA-256 digest of a bearer token held by the HTTP layer.
///
/// Only the digest is retained. Presented tokens are hashed before the
/// comparison, so comparison time does not depend on the shared prefix
/// length of the raw secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenDigest([u8; 32]);

impl TokenDigest {
    /// Digest the configured token.
    #[must_use]
    pub fn of(token: &str) -> Self {
        Self(Sha256::digest(token.as_bytes()).into())
    }

    /// Whether `presented` hashes to the same digest.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        let other = Self::of(presented);
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenDigest")
            .field(&hex::encode(&self.0[..4]))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_stable_and_short() {
        let key = Key::from(&[7u8; 64][..]);
        let first = key_fingerprint(&key);
        assert_eq!(first.len(), 16);
        assert_eq!(first, key_fingerprint(&key));
    }

    #[rstest]
    #[case("s3cret-token", true)]
    #[case("s3cret-tokem", false)]
    #[case("", false)]
    fn token_digest_matches_only_the_same_token(#[case] presented: &str, #[case] expected: bool) {
        let digest = TokenDigest::of("s3cret-token");
        assert_eq!(digest.matches(presented), expected);
    }
}
