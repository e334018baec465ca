//! Hostname normalization and matching for blocking decisions.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Permissive RFC-1123-style hostname check: alphanumeric/hyphen labels,
/// no leading or trailing hyphen, label length <= 63.
static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("hostname regex")
});

/// Extract the lowercase hostname from a full URL.
///
/// Parse failure yields an empty string, which short-circuits all
/// blocking checks downstream.
pub fn domain_from_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().unwrap_or("").to_lowercase(),
        Err(_) => String::new(),
    }
}

/// Normalize user input that may include a scheme or path to a plain
/// hostname: lowercase with one leading `www.` stripped.
///
/// Input that looks like a URL goes through the URL parser; anything else
/// (including unparseable URL-ish input) gets the basic cleanup.
pub fn hostname_from_input(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let lower = trimmed.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        if let Ok(parsed) = Url::parse(trimmed) {
            if let Some(host) = parsed.host_str() {
                return strip_www(&host.to_lowercase()).to_string();
            }
        }
    }

    strip_www(&lower).to_string()
}

/// Validate a candidate hostname before it is accepted into the blocklist.
pub fn is_valid_domain(domain: &str) -> bool {
    DOMAIN_RE.is_match(domain)
}

/// Exact or subdomain match of a hostname against a stored site domain.
/// The URL path is never consulted: every path under a blocked domain is
/// covered equally.
pub fn domain_matches(host: &str, site_domain: &str) -> bool {
    let site = strip_www(site_domain);
    host == site || host.ends_with(&format!(".{site}"))
}

pub(crate) fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
