//! Site locker facade - coordinates the store, matching and sessions

mod password_ops;
mod sessions;
mod settings;
mod sites;
#[cfg(test)]
mod tests;

use crate::storage::KvStore;
use crate::Result;
use std::path::Path;

/// Handle over the shared store. Every surface (daemon, native messaging
/// host, CLI) goes through this type; clones share the same store.
#[derive(Clone)]
pub struct SiteLocker {
    store: KvStore,
}

impl SiteLocker {
    /// Open (or create) the store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            store: KvStore::open(path)?,
        })
    }

    /// In-memory locker for testing.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            store: KvStore::in_memory()?,
        })
    }

    /// Wrap an already-open store.
    pub fn with_store(store: KvStore) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &KvStore {
        &self.store
    }
}
