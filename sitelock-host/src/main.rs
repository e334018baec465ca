use std::io::{Read, Write};

use anyhow::Result;
use sitelock_core::ipc::{read_frame, write_frame, Request, Response, TabPush};
use sitelock_core::tabs::TabTracker;
use sitelock_core::{LockEngine, SiteLocker};
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Log to stderr; stdout carries the message frames.
    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("starting site locker host v{}", VERSION);

    let store_path = sitelock_core::ensure_data_dir().map(|dir| dir.join("sitelock.db"))?;
    let locker = SiteLocker::open(store_path)?;
    let engine = LockEngine::new(locker);
    engine.on_startup()?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_session(&engine, &mut stdin.lock(), &mut stdout.lock())?;

    info!("extension disconnected, host exiting");
    Ok(())
}

/// One extension connection: read frames until the peer closes stdin.
///
/// Engine failures never end the session; each entry point answers its
/// fail-safe default (do not lock, do not authorize) and logs the error.
fn run_session<R: Read, W: Write>(engine: &LockEngine, input: &mut R, output: &mut W) -> Result<()> {
    let mut tracker = TabTracker::new();

    while let Some(request) = read_frame::<_, Request>(input)? {
        match request {
            Request::CheckLockStatus { domain, url } => {
                let should_lock = engine.should_lock(&domain, &url).unwrap_or_else(|e| {
                    warn!(domain = %domain, error = %e, "lock check failed, answering unlocked");
                    false
                });
                debug!(domain = %domain, should_lock, "lock status checked");
                write_frame(output, &Response::LockStatus { should_lock })?;
            }
            Request::VerifyPassword { password, domain } => {
                let success = engine.verify_password(&password, &domain).unwrap_or_else(|e| {
                    warn!(domain = %domain, error = %e, "password verification failed, answering rejected");
                    false
                });
                write_frame(output, &Response::Verify { success })?;
            }
            Request::NavigationCompleted { tab_id, url } => {
                let directive = tracker
                    .navigation_completed(engine, tab_id, &url)
                    .unwrap_or_else(|e| {
                        warn!(tab_id, error = %e, "navigation check failed, not locking");
                        None
                    });
                if let Some(directive) = directive {
                    write_frame(
                        output,
                        &TabPush::LockSite {
                            domain: directive.domain,
                        },
                    )?;
                }
            }
        }
    }

    Ok(())
}
