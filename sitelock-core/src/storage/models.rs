//! Persisted data shapes.
//!
//! Field spelling matches the stored JSON format (camelCase, millisecond
//! timestamps), so an existing store remains readable.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A domain record the locker attempts to restrict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedSite {
    pub id: String,
    /// Normalized hostname (lowercase, `www.`-stripped).
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

impl BlockedSite {
    /// New active record for a normalized domain. The display name falls
    /// back to the domain itself.
    pub fn new(domain: String, name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.or_else(|| Some(domain.clone())),
            domain,
            is_active: true,
            created_at: now_millis(),
        }
    }
}

/// A temporary per-domain grant that suppresses the lock screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedSession {
    /// Normalized hostname (lowercase, `www.`-stripped).
    pub domain: String,
    pub authorized_at: i64,
    /// Absent means the session never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Global settings. Defaults are merged under any stored partial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Session lifetime in minutes; 0 means sessions never expire.
    pub session_timeout: u64,
    pub require_password_on_restart: bool,
    pub is_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            session_timeout: 30,
            require_password_on_restart: true,
            is_enabled: true,
        }
    }
}

impl Settings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(session_timeout) = patch.session_timeout {
            self.session_timeout = session_timeout;
        }
        if let Some(require_password_on_restart) = patch.require_password_on_restart {
            self.require_password_on_restart = require_password_on_restart;
        }
        if let Some(is_enabled) = patch.is_enabled {
            self.is_enabled = is_enabled;
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub session_timeout: Option<u64>,
    pub require_password_on_restart: Option<bool>,
    pub is_enabled: Option<bool>,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
