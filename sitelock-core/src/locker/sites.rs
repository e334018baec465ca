//! Blocked-site list operations.

use super::SiteLocker;
use crate::domain::{domain_from_url, domain_matches, hostname_from_input, is_valid_domain, strip_www};
use crate::storage::models::BlockedSite;
use crate::storage::KEY_BLOCKED_SITES;
use crate::{LockerError, Result};
use serde_json::Value;
use tracing::debug;

impl SiteLocker {
    /// All stored sites. Malformed entries are dropped, never an error.
    pub fn blocked_sites(&self) -> Result<Vec<BlockedSite>> {
        Ok(decode_sites(self.store().get_value(KEY_BLOCKED_SITES)?))
    }

    /// Add a site to the blocklist.
    ///
    /// The input is normalized to a plain hostname and validated. Re-adding
    /// an existing domain overwrites its record in place (fresh id, active
    /// again) instead of duplicating it.
    pub fn add_blocked_site(&self, domain_input: &str, name: Option<&str>) -> Result<BlockedSite> {
        let domain = hostname_from_input(domain_input);
        if domain.is_empty() || !is_valid_domain(&domain) {
            return Err(LockerError::InvalidDomain(domain_input.to_string()));
        }

        let site = BlockedSite::new(domain, name.map(str::to_string));
        let stored = site.clone();
        self.store().update(KEY_BLOCKED_SITES, move |current| {
            let mut sites = decode_sites(current);
            match sites.iter_mut().find(|s| s.domain == site.domain) {
                Some(existing) => *existing = site,
                None => sites.push(site),
            }
            Ok(serde_json::to_value(&sites)?)
        })?;

        debug!(domain = %stored.domain, "blocked site added");
        Ok(stored)
    }

    /// Remove a site by id. Unknown ids are a no-op.
    pub fn remove_blocked_site(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.store().update(KEY_BLOCKED_SITES, move |current| {
            let mut sites = decode_sites(current);
            sites.retain(|s| s.id != id);
            Ok(serde_json::to_value(&sites)?)
        })
    }

    /// Flip a site's active flag. Unknown ids are a no-op.
    pub fn toggle_blocked_site(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.store().update(KEY_BLOCKED_SITES, move |current| {
            let mut sites = decode_sites(current);
            if let Some(site) = sites.iter_mut().find(|s| s.id == id) {
                site.is_active = !site.is_active;
            }
            Ok(serde_json::to_value(&sites)?)
        })
    }

    /// Whether a full URL falls under any active blocked site.
    ///
    /// An unparseable URL has no hostname and is never blocked.
    pub fn is_url_blocked(&self, url: &str) -> Result<bool> {
        let host = domain_from_url(url);
        self.is_host_blocked(strip_www(&host))
    }

    /// Legacy bare-domain variant of [`SiteLocker::is_url_blocked`], kept
    /// for callers that only have a hostname.
    pub fn is_domain_blocked(&self, domain: &str) -> Result<bool> {
        let lower = domain.to_lowercase();
        self.is_host_blocked(strip_www(&lower))
    }

    fn is_host_blocked(&self, host: &str) -> Result<bool> {
        if host.is_empty() {
            return Ok(false);
        }
        Ok(self
            .blocked_sites()?
            .iter()
            .any(|site| site.is_active && domain_matches(host, &site.domain)))
    }
}

fn decode_sites(value: Option<Value>) -> Vec<BlockedSite> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}
