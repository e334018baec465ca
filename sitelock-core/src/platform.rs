//! Platform-specific paths for the shared store.

use std::path::PathBuf;

/// Get the platform-specific data directory for storing application data
///
/// Returns:
/// - Windows: %LOCALAPPDATA%\SiteLock
/// - macOS: ~/Library/Application Support/SiteLock
/// - Linux/Other: ~/.local/share/SiteLock
pub fn get_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".data")))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("SiteLock")
}

/// Get the default store path.
pub fn default_store_path() -> PathBuf {
    get_data_dir().join("sitelock.db")
}

/// Ensure the data directory exists, creating it if necessary
pub fn ensure_data_dir() -> std::io::Result<PathBuf> {
    let dir = get_data_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
