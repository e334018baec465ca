//! Explicit per-tab lock state machine.
//!
//! The coordinator tracks what each tab was last told. Transitions happen
//! only through the declared events below, so the lifecycle can be tested
//! without a live browser.

use crate::domain::strip_www;
use crate::engine::LockEngine;
use crate::Result;
use std::collections::HashMap;

pub type TabId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabLockState {
    /// No decision has been made for the current navigation.
    Unchecked,
    /// The lock overlay has been requested for this tab.
    Locked,
    /// The password was accepted; the tab is expected to reload.
    Unlocked,
}

/// A lock instruction destined for one tab's client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockDirective {
    pub tab_id: TabId,
    pub domain: String,
}

/// Tracks the lock state of every known tab, and for locked tabs the
/// domain their overlay belongs to.
#[derive(Default)]
pub struct TabTracker {
    states: HashMap<TabId, TabLockState>,
    locked_domains: HashMap<TabId, String>,
}

impl TabTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, tab_id: TabId) -> TabLockState {
        self.states
            .get(&tab_id)
            .copied()
            .unwrap_or(TabLockState::Unchecked)
    }

    /// A navigation finished loading in `tab_id`. Runs the lock decision
    /// and returns a directive when the tab transitions to Locked.
    pub fn navigation_completed(
        &mut self,
        engine: &LockEngine,
        tab_id: TabId,
        url: &str,
    ) -> Result<Option<LockDirective>> {
        // Every completed navigation restarts the decision for that tab.
        self.states.insert(tab_id, TabLockState::Unchecked);
        self.locked_domains.remove(&tab_id);

        match engine.lock_due_for_navigation(url)? {
            Some(domain) => {
                self.states.insert(tab_id, TabLockState::Locked);
                self.locked_domains.insert(tab_id, normalize(&domain));
                Ok(Some(LockDirective { tab_id, domain }))
            }
            None => Ok(None),
        }
    }

    /// The password was accepted for `domain`. Tabs locked for that exact
    /// domain transition to Unlocked; tabs locked for other domains keep
    /// their overlay. Returns the transitioned tab ids.
    pub fn password_accepted(&mut self, domain: &str) -> Vec<TabId> {
        let target = normalize(domain);
        let mut unlocked = Vec::new();
        for (&tab_id, state) in self.states.iter_mut() {
            if *state == TabLockState::Locked
                && self.locked_domains.get(&tab_id) == Some(&target)
            {
                *state = TabLockState::Unlocked;
                unlocked.push(tab_id);
            }
        }
        for tab_id in &unlocked {
            self.locked_domains.remove(tab_id);
        }
        unlocked.sort_unstable();
        unlocked
    }

    /// The tab reloaded after unlocking; the next navigation decides again.
    pub fn reloaded(&mut self, tab_id: TabId) {
        self.states.insert(tab_id, TabLockState::Unchecked);
        self.locked_domains.remove(&tab_id);
    }

    /// Forget a closed tab.
    pub fn closed(&mut self, tab_id: TabId) {
        self.states.remove(&tab_id);
        self.locked_domains.remove(&tab_id);
    }
}

fn normalize(domain: &str) -> String {
    strip_www(&domain.to_lowercase()).to_string()
}
