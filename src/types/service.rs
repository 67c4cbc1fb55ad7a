use serde::{Deserialize, Serialize};

use super::icon::Icon;

/// A bookmarked network service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: Icon,
    pub last_seen_online: Option<i64>,
    pub position: usize,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Service {
    /// Whether the service answered within `window_secs` before `now`.
    pub fn was_online_recently(&self, now: i64, window_secs: i64) -> bool {
        match self.last_seen_online {
            Some(seen) => seen <= now && now.checked_sub(seen).is_some_and(|age| age <= window_secs),
            None => false,
        }
    }
}

/// User input for a new service. A missing icon is replaced by the placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub url: String,
    pub icon: Option<Icon>,
}

impl NewService {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// Replacement values for an edited service. `icon: None` keeps the current icon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUpdate {
    pub name: String,
    pub url: String,
    pub icon: Option<Icon>,
}

impl ServiceUpdate {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }
}
