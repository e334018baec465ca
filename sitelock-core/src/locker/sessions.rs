//! Per-domain authorization sessions with lazy expiry.

use super::SiteLocker;
use crate::domain::strip_www;
use crate::storage::models::{now_millis, AuthorizedSession};
use crate::storage::KEY_AUTHORIZED_SESSIONS;
use crate::Result;
use serde_json::Value;
use tracing::debug;

impl SiteLocker {
    /// All stored sessions, including any not yet lazily purged.
    pub fn authorized_sessions(&self) -> Result<Vec<AuthorizedSession>> {
        Ok(decode_sessions(
            self.store().get_value(KEY_AUTHORIZED_SESSIONS)?,
        ))
    }

    /// Exact-domain authorization check. A session for `example.com` does
    /// not cover `sub.example.com`, or the reverse.
    ///
    /// An expired session is deleted as a side effect of being found here.
    pub fn is_session_authorized(&self, domain: &str) -> Result<bool> {
        let host = normalize_session_domain(domain);
        let sessions = self.authorized_sessions()?;
        let Some(session) = sessions.iter().find(|s| s.domain.to_lowercase() == host) else {
            return Ok(false);
        };

        if let Some(expires_at) = session.expires_at {
            if now_millis() > expires_at {
                debug!(domain = %host, "session expired, purging");
                self.remove_session(&host)?;
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Authorize a domain, replacing any existing session for it.
    ///
    /// Expiry is now plus the configured timeout; a timeout of 0 yields a
    /// session that never expires.
    pub fn authorize_session(&self, domain: &str) -> Result<AuthorizedSession> {
        let host = normalize_session_domain(domain);
        let timeout = self.settings()?.session_timeout;
        let authorized_at = now_millis();
        // A timeout of 0, or one too large to represent, means no expiry.
        let expires_at = i64::try_from(timeout)
            .ok()
            .filter(|&minutes| minutes > 0)
            .and_then(|minutes| minutes.checked_mul(60_000))
            .and_then(|span| authorized_at.checked_add(span));
        let session = AuthorizedSession {
            domain: host,
            authorized_at,
            expires_at,
        };

        let stored = session.clone();
        self.store().update(KEY_AUTHORIZED_SESSIONS, move |current| {
            let mut sessions = decode_sessions(current);
            sessions.retain(|s| s.domain.to_lowercase() != session.domain);
            sessions.push(session);
            Ok(serde_json::to_value(&sessions)?)
        })?;

        Ok(stored)
    }

    /// Drop the session for one domain, if present.
    pub fn remove_session(&self, domain: &str) -> Result<()> {
        let host = normalize_session_domain(domain);
        self.store().update(KEY_AUTHORIZED_SESSIONS, move |current| {
            let mut sessions = decode_sessions(current);
            sessions.retain(|s| s.domain.to_lowercase() != host);
            Ok(serde_json::to_value(&sessions)?)
        })
    }

    /// Unconditionally empty the session list.
    pub fn clear_sessions(&self) -> Result<()> {
        self.store()
            .set_value(KEY_AUTHORIZED_SESSIONS, &Value::Array(Vec::new()))
    }
}

fn normalize_session_domain(domain: &str) -> String {
    strip_www(&domain.to_lowercase()).to_string()
}

fn decode_sessions(value: Option<Value>) -> Vec<AuthorizedSession> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}
