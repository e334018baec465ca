//! Site Locker Core Library
//!
//! This library provides the core functionality for the site locker:
//! the shared key/value store, domain matching, authorization sessions,
//! the password lifecycle and the lock coordination engine.

pub mod domain;
pub mod engine;
pub mod ipc;
pub mod locker;
pub mod password;
pub mod platform;
pub mod storage;
pub mod tabs;

pub use engine::LockEngine;
pub use locker::SiteLocker;
pub use platform::{default_store_path, ensure_data_dir, get_data_dir};
pub use storage::models::{AuthorizedSession, BlockedSite, Settings, SettingsPatch};
pub use storage::KvStore;

use thiserror::Error;

/// Result type for site locker operations
pub type Result<T> = std::result::Result<T, LockerError>;

/// General error type for site locker operations
#[derive(Error, Debug)]
pub enum LockerError {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Message frame too large: {0} bytes")]
    FrameTooLarge(usize),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
