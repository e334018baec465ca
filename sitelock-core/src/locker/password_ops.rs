//! Stored credential lifecycle.

use super::SiteLocker;
use crate::password::{hash_password, verify_password};
use crate::storage::KEY_PASSWORD_HASH;
use crate::Result;
use serde_json::Value;

impl SiteLocker {
    /// Hash and store the password as the sole credential.
    pub fn set_password(&self, password: &str) -> Result<()> {
        self.store()
            .set_value(KEY_PASSWORD_HASH, &Value::String(hash_password(password)))
    }

    /// Whether any credential is configured. An empty stored string counts
    /// as unconfigured.
    pub fn has_password(&self) -> Result<bool> {
        Ok(self.stored_hash()?.is_some())
    }

    /// Verify a password. Fails closed: with no stored hash, nothing ever
    /// verifies.
    pub fn check_password(&self, password: &str) -> Result<bool> {
        match self.stored_hash()? {
            Some(hash) => Ok(verify_password(password, &hash)),
            None => Ok(false),
        }
    }

    fn stored_hash(&self) -> Result<Option<String>> {
        Ok(self
            .store()
            .get_value(KEY_PASSWORD_HASH)?
            .and_then(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            }))
    }
}
