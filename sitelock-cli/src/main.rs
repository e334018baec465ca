use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use rpassword::prompt_password;
use sitelock_core::{LockEngine, Settings, SettingsPatch, SiteLocker};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const MIN_PASSWORD_LEN: usize = 4;

/// Site Locker CLI - manage the blocklist, password and sessions
#[derive(Parser)]
#[command(name = "sitelock")]
#[command(about = "Manage the site locker store", long_about = None)]
struct Cli {
    /// Path to the store (defaults to the platform data directory)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a site to the blocklist
    Add {
        /// Domain or URL to block
        domain: String,

        /// Display name for the entry
        #[arg(long)]
        name: Option<String>,
    },

    /// Remove a site by id
    Remove {
        /// Entry id as shown by `list`
        id: String,
    },

    /// Flip a site's active flag
    Toggle {
        /// Entry id as shown by `list`
        id: String,
    },

    /// List the blocklist
    List,

    /// Set the unlock password (prompts when not provided)
    SetPassword {
        #[arg(long)]
        password: Option<String>,
    },

    /// Verify a password and optionally authorize a domain
    Verify {
        #[arg(long)]
        password: Option<String>,

        /// Authorize a session for this domain on success
        #[arg(long)]
        domain: Option<String>,
    },

    /// Report blocklist/session totals and where a URL stands
    Status {
        url: String,
    },

    /// List authorized sessions
    Sessions,

    /// Drop the session for one domain
    Revoke {
        domain: String,
    },

    /// Drop all authorized sessions
    ClearSessions,

    /// Show or change settings
    Settings {
        /// Session lifetime in minutes (0 disables expiry)
        #[arg(long)]
        timeout: Option<u64>,

        /// Whether sessions are cleared on restart
        #[arg(long)]
        require_password_on_restart: Option<bool>,

        /// Whether locking is enabled at all
        #[arg(long)]
        enabled: Option<bool>,
    },
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let store_path = match cli.store {
        Some(path) => path,
        None => {
            sitelock_core::ensure_data_dir()?;
            sitelock_core::default_store_path()
        }
    };
    let locker = SiteLocker::open(&store_path)?;

    match cli.command {
        Commands::Add { domain, name } => {
            let site = locker.add_blocked_site(&domain, name.as_deref())?;
            println!("Blocked {} (id {})", site.domain, site.id);
        }
        Commands::Remove { id } => {
            locker.remove_blocked_site(&id)?;
            println!("Removed {id}");
        }
        Commands::Toggle { id } => {
            locker.toggle_blocked_site(&id)?;
            println!("Toggled {id}");
        }
        Commands::List => {
            let sites = locker.blocked_sites()?;
            if sites.is_empty() {
                println!("No blocked sites.");
            }
            for site in sites {
                let state = if site.is_active { "active" } else { "inactive" };
                println!(
                    "{}  {}  [{}]  added {}",
                    site.id,
                    site.domain,
                    state,
                    format_millis(site.created_at)
                );
            }
        }
        Commands::SetPassword { password } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let first = prompt_password("New password: ")?;
                    let second = prompt_password("Repeat password: ")?;
                    if first != second {
                        bail!("passwords do not match");
                    }
                    first
                }
            };
            if password.len() < MIN_PASSWORD_LEN {
                bail!("password must be at least {MIN_PASSWORD_LEN} characters");
            }
            locker.set_password(&password)?;
            println!("Password updated.");
        }
        Commands::Verify { password, domain } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password: ")?,
            };
            let accepted = match domain {
                Some(domain) => LockEngine::new(locker).verify_password(&password, &domain)?,
                None => locker.check_password(&password)?,
            };
            if accepted {
                println!("Password accepted.");
            } else {
                println!("Password rejected.");
                std::process::exit(1);
            }
        }
        Commands::Status { url } => {
            let active_sites = locker
                .blocked_sites()?
                .iter()
                .filter(|site| site.is_active)
                .count();
            let sessions = locker.authorized_sessions()?.len();
            println!("{active_sites} active blocked sites, {sessions} authorized sessions");

            let state = site_state(&locker, &url)?;
            println!("{url}: {state}");
        }
        Commands::Sessions => {
            let sessions = locker.authorized_sessions()?;
            if sessions.is_empty() {
                println!("No authorized sessions.");
            }
            for session in sessions {
                let expiry = match session.expires_at {
                    Some(at) => format!("expires {}", format_millis(at)),
                    None => "never expires".to_string(),
                };
                println!(
                    "{}  authorized {}  {}",
                    session.domain,
                    format_millis(session.authorized_at),
                    expiry
                );
            }
        }
        Commands::Revoke { domain } => {
            locker.remove_session(&domain)?;
            println!("Revoked session for {domain}");
        }
        Commands::ClearSessions => {
            locker.clear_sessions()?;
            println!("All sessions cleared.");
        }
        Commands::Settings {
            timeout,
            require_password_on_restart,
            enabled,
        } => {
            let patch = SettingsPatch {
                session_timeout: timeout,
                require_password_on_restart,
                is_enabled: enabled,
            };
            let settings = if patch == SettingsPatch::default() {
                locker.settings()?
            } else {
                locker.update_settings(&patch)?
            };
            print_settings(&settings);
        }
    }

    Ok(())
}

/// Three-way current-site readout: a blocked URL is either covered by a
/// session (`authorized`) or due for the lock screen (`locked`); anything
/// off the blocklist is `unrestricted`.
fn site_state(locker: &SiteLocker, url: &str) -> Result<&'static str> {
    if !locker.is_url_blocked(url)? {
        return Ok("unrestricted");
    }
    let domain = sitelock_core::domain::domain_from_url(url);
    if locker.is_session_authorized(&domain)? {
        Ok("authorized")
    } else {
        Ok("locked")
    }
}

fn print_settings(settings: &Settings) {
    println!("session timeout: {} minutes", settings.session_timeout);
    println!(
        "require password on restart: {}",
        settings.require_password_on_restart
    );
    println!("enabled: {}", settings.is_enabled);
}

fn format_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M").to_string(),
        None => millis.to_string(),
    }
}
