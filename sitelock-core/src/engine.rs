//! Lock decisions and the coordinator-level flows behind every message.

use crate::domain::domain_from_url;
use crate::locker::SiteLocker;
use crate::Result;
use tracing::{debug, info};

/// Decision layer over [`SiteLocker`]. One instance (or clones of it) is
/// shared by the daemon, the native messaging host and the CLI.
#[derive(Clone)]
pub struct LockEngine {
    locker: SiteLocker,
}

impl LockEngine {
    pub fn new(locker: SiteLocker) -> Self {
        Self { locker }
    }

    pub fn locker(&self) -> &SiteLocker {
        &self.locker
    }

    /// Should the lock screen be shown for this page?
    ///
    /// False when locking is globally disabled, when the URL is not
    /// blocked, when the domain is empty, or when a valid session already
    /// covers the domain.
    pub fn should_lock(&self, domain: &str, url: &str) -> Result<bool> {
        let settings = self.locker.settings()?;
        if !settings.is_enabled {
            return Ok(false);
        }
        if !self.locker.is_url_blocked(url)? {
            return Ok(false);
        }
        if domain.is_empty() {
            return Ok(false);
        }
        Ok(!self.locker.is_session_authorized(domain)?)
    }

    /// Navigation variant of [`LockEngine::should_lock`]: derives the
    /// domain from the URL and returns it when a lock is due.
    pub fn lock_due_for_navigation(&self, url: &str) -> Result<Option<String>> {
        let domain = domain_from_url(url);
        if domain.is_empty() {
            return Ok(None);
        }
        if self.should_lock(&domain, url)? {
            Ok(Some(domain))
        } else {
            Ok(None)
        }
    }

    /// Verify a password and, on success, authorize a session for the
    /// domain.
    pub fn verify_password(&self, password: &str, domain: &str) -> Result<bool> {
        let valid = self.locker.check_password(password)?;
        if valid {
            self.locker.authorize_session(domain)?;
            info!(domain = %domain, "password accepted, session authorized");
        } else {
            debug!(domain = %domain, "password rejected");
        }
        Ok(valid)
    }

    /// Startup hook: sessions survive a restart only when the settings
    /// allow it.
    pub fn on_startup(&self) -> Result<()> {
        if self.locker.settings()?.require_password_on_restart {
            info!("clearing authorized sessions on startup");
            self.locker.clear_sessions()?;
        }
        Ok(())
    }

    /// Fresh-install hook: sessions are always wiped.
    pub fn on_installed(&self) -> Result<()> {
        info!("clearing authorized sessions on install");
        self.locker.clear_sessions()
    }
}
