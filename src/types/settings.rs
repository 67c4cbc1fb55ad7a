use serde::{Deserialize, Serialize};

use super::icon::DEFAULT_WIDE_ICON_ASPECT_RATIO;

/// Top-level dashboard settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardSettings {
    pub display: DisplaySettings,
    pub network: NetworkSettings,
    pub storage: StorageSettings,
}

/// How services are presented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySettings {
    /// Icons whose width/height exceeds this are fitted instead of filled.
    pub wide_icon_aspect_ratio: f64,
    /// A service seen online within this many seconds counts as "online recently".
    pub online_recently_window_secs: i64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            wide_icon_aspect_ratio: DEFAULT_WIDE_ICON_ASPECT_RATIO,
            online_recently_window_secs: 300,
        }
    }
}

/// Favicon fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSettings {
    pub favicon_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            favicon_timeout_secs: 10,
            user_agent: format!("dashboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Where services are stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// SQLite file name, resolved against the platform data directory when relative.
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "dashboard.db".to_string(),
        }
    }
}
