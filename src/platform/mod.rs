// Dashboard platform paths
// Resolves per-user config and data directories for Linux, macOS and Windows.

use std::env;
use std::path::PathBuf;

const APP_DIR_UNIX: &str = "dashboard";
const APP_DIR_DESKTOP: &str = "Dashboard";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/dashboard` or `~/.config/dashboard`
/// - **macOS**: `~/Library/Application Support/Dashboard`
/// - **Windows**: `%APPDATA%/Dashboard`
pub fn get_config_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_DESKTOP)
    } else if cfg!(target_os = "windows") {
        appdata_dir().join(APP_DIR_DESKTOP)
    } else {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR_UNIX),
            Err(_) => home_dir().join(".config").join(APP_DIR_UNIX),
        }
    }
}

/// Directory holding the service database.
///
/// - **Linux**: `$XDG_DATA_HOME/dashboard` or `~/.local/share/dashboard`
/// - **macOS**, **Windows**: same as the config directory
pub fn get_data_dir() -> PathBuf {
    if cfg!(any(target_os = "macos", target_os = "windows")) {
        get_config_dir()
    } else {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR_UNIX),
            Err(_) => home_dir().join(".local").join("share").join(APP_DIR_UNIX),
        }
    }
}

fn appdata_dir() -> PathBuf {
    PathBuf::from(
        env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming")),
    )
}
