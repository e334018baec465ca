//! TCP coordinator server.
//!
//! Clients connect over localhost TCP and exchange newline-delimited JSON
//! messages. A tab client announces itself with NAVIGATION_COMPLETED, which
//! registers its connection for pushes; request/response messages are
//! answered on the same stream.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sitelock_core::engine::LockEngine;
use sitelock_core::ipc::{Request, Response, TabPush};
use sitelock_core::tabs::{TabId, TabTracker};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

/// Push delivery failure. Losing a push means the tab keeps its current
/// overlay state, so callers decide how loudly to react.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no client registered for tab {0}")]
    NotConnected(TabId),

    #[error("client for tab {0} disconnected")]
    Disconnected(TabId),
}

/// Maps tab ids to the outbound push channel of their connection.
#[derive(Clone, Default)]
pub struct TabRegistry {
    inner: Arc<Mutex<HashMap<TabId, mpsc::UnboundedSender<TabPush>>>>,
}

impl TabRegistry {
    pub async fn register(&self, tab_id: TabId, sender: mpsc::UnboundedSender<TabPush>) {
        self.inner.lock().await.insert(tab_id, sender);
    }

    pub async fn remove(&self, tab_id: TabId) {
        self.inner.lock().await.remove(&tab_id);
    }

    /// Deliver a push to one tab. A dead channel is dropped from the
    /// registry before the error is reported.
    pub async fn push(&self, tab_id: TabId, push: TabPush) -> Result<(), DeliveryError> {
        let mut registry = self.inner.lock().await;
        let sender = registry
            .get(&tab_id)
            .ok_or(DeliveryError::NotConnected(tab_id))?;
        if sender.send(push).is_err() {
            registry.remove(&tab_id);
            return Err(DeliveryError::Disconnected(tab_id));
        }
        Ok(())
    }
}

pub struct LockServer {
    engine: LockEngine,
    tracker: Mutex<TabTracker>,
    registry: TabRegistry,
}

impl LockServer {
    pub fn new(engine: LockEngine) -> Self {
        Self {
            engine,
            tracker: Mutex::new(TabTracker::new()),
            registry: TabRegistry::default(),
        }
    }

    /// Accept loop. Each connection gets its own task.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            debug!(%peer, "client connected");
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.handle_connection(stream).await {
                    warn!(%peer, error = %e, "connection ended with error");
                }
                debug!(%peer, "client disconnected");
            });
        }
    }

    async fn handle_connection(&self, stream: TcpStream) -> anyhow::Result<()> {
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let (push_tx, mut push_rx) = mpsc::unbounded_channel::<TabPush>();
        let mut registered_tabs: HashSet<TabId> = HashSet::new();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let request: Request = match serde_json::from_str(&line) {
                        Ok(request) => request,
                        Err(e) => {
                            warn!(error = %e, "dropping unparseable request");
                            continue;
                        }
                    };
                    if let Some(response) = self
                        .handle_request(request, &push_tx, &mut registered_tabs)
                        .await
                    {
                        let mut out = serde_json::to_string(&response)?;
                        out.push('\n');
                        write_half.write_all(out.as_bytes()).await?;
                    }
                }
                Some(push) = push_rx.recv() => {
                    let mut out = serde_json::to_string(&push)?;
                    out.push('\n');
                    write_half.write_all(out.as_bytes()).await?;
                }
            }
        }

        // The connection owns its tabs; dropping it closes them.
        let mut tracker = self.tracker.lock().await;
        for tab_id in registered_tabs {
            self.registry.remove(tab_id).await;
            tracker.closed(tab_id);
        }
        Ok(())
    }

    /// Engine failures never tear down the connection: every entry point
    /// answers its fail-safe default (do not lock, do not authorize) and
    /// logs the error.
    async fn handle_request(
        &self,
        request: Request,
        push_tx: &mpsc::UnboundedSender<TabPush>,
        registered_tabs: &mut HashSet<TabId>,
    ) -> Option<Response> {
        match request {
            Request::CheckLockStatus { domain, url } => {
                let should_lock = self.engine.should_lock(&domain, &url).unwrap_or_else(|e| {
                    warn!(domain = %domain, error = %e, "lock check failed, answering unlocked");
                    false
                });
                Some(Response::LockStatus { should_lock })
            }
            Request::VerifyPassword { password, domain } => {
                let success = self
                    .engine
                    .verify_password(&password, &domain)
                    .unwrap_or_else(|e| {
                        warn!(domain = %domain, error = %e, "password verification failed, answering rejected");
                        false
                    });
                if success {
                    let unlocked = self.tracker.lock().await.password_accepted(&domain);
                    if !unlocked.is_empty() {
                        debug!(domain = %domain, ?unlocked, "tabs unlocked");
                    }
                }
                Some(Response::Verify { success })
            }
            Request::NavigationCompleted { tab_id, url } => {
                self.registry.register(tab_id, push_tx.clone()).await;
                registered_tabs.insert(tab_id);

                let directive = {
                    let mut tracker = self.tracker.lock().await;
                    match tracker.navigation_completed(&self.engine, tab_id, &url) {
                        Ok(directive) => directive,
                        Err(e) => {
                            warn!(tab_id, error = %e, "navigation check failed, not locking");
                            None
                        }
                    }
                };
                if let Some(directive) = directive {
                    let push = TabPush::LockSite {
                        domain: directive.domain,
                    };
                    if let Err(e) = self.registry.push(directive.tab_id, push).await {
                        warn!(tab_id = directive.tab_id, error = %e, "lock push not delivered");
                    }
                }
                None
            }
        }
    }
}
