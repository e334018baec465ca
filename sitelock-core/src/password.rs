//! Password hashing.
//!
//! A single unsalted SHA-256 hash compared by equality, matching the
//! persisted format this engine replaces. Known weakness: no salt or
//! stretching, so predictable passwords are exposed to precomputed-hash
//! attacks.

use sha2::{Digest, Sha256};

/// Hash a password: SHA-256 over the UTF-8 bytes, lowercase hex.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}

/// Compare a candidate password against a stored hex hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}
