//! Cross-context message types.
//!
//! The wire spelling (`type` tags, camelCase fields) matches the message
//! format of the browser extension this coordinator serves.

use serde::{Deserialize, Serialize};

/// Requests handled by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Request/response: should this page show the lock overlay?
    #[serde(rename = "CHECK_LOCK_STATUS")]
    CheckLockStatus { domain: String, url: String },

    /// Request/response: verify the password and authorize the domain.
    #[serde(rename = "VERIFY_PASSWORD")]
    VerifyPassword { password: String, domain: String },

    /// Fire-and-forget navigation report from a tab client.
    #[serde(rename = "NAVIGATION_COMPLETED", rename_all = "camelCase")]
    NavigationCompleted { tab_id: u64, url: String },
}

/// Replies to the request/response messages above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    LockStatus { should_lock: bool },
    Verify { success: bool },
}

/// Pushes from the coordinator to a tab client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TabPush {
    /// Show the lock overlay for a domain.
    #[serde(rename = "LOCK_SITE")]
    LockSite { domain: String },

    /// Hide the lock overlay. Decoded for parity with the extension, which
    /// defines this message on the receiving side but has no sender for it.
    #[serde(rename = "UNLOCK_SITE")]
    UnlockSite,
}
