// Dashboard Settings Engine
// Loads, edits and persists `DashboardSettings` as pretty JSON at the
// platform config path (or an explicit override).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::DashboardSettings;

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<DashboardSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &DashboardSettings;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn config_path(&self) -> &Path;
}

pub struct SettingsEngine {
    config_path: PathBuf,
    settings: DashboardSettings,
}

impl SettingsEngine {
    /// Uses `path_override` if given, otherwise `<config dir>/settings.json`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join("settings.json"));
        Self {
            config_path,
            settings: DashboardSettings::default(),
        }
    }

    /// Rejects values that deserialize fine but make no sense.
    fn check_ranges(settings: &DashboardSettings) -> Result<(), SettingsError> {
        if !(settings.display.wide_icon_aspect_ratio > 0.0) {
            return Err(SettingsError::InvalidValue(
                "display.wide_icon_aspect_ratio must be positive".to_string(),
            ));
        }
        if settings.display.online_recently_window_secs < 0 {
            return Err(SettingsError::InvalidValue(
                "display.online_recently_window_secs must not be negative".to_string(),
            ));
        }
        if settings.network.favicon_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "network.favicon_timeout_secs must be at least 1".to_string(),
            ));
        }
        if settings.storage.database_file.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "storage.database_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the config file. A missing file yields defaults; a malformed one is an error.
    fn load(&mut self) -> Result<DashboardSettings, SettingsError> {
        if !self.config_path.exists() {
            log::debug!(
                "no settings at {}, using defaults",
                self.config_path.display()
            );
            self.settings = DashboardSettings::default();
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| SettingsError::IoError(format!("Failed to read config file: {}", e)))?;
        let settings: DashboardSettings = serde_json::from_str(&content).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        Self::check_ranges(&settings)?;

        self.settings = settings;
        Ok(self.settings.clone())
    }

    /// Writes the current settings, creating parent directories as needed.
    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SettingsError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;
        fs::write(&self.config_path, json)
            .map_err(|e| SettingsError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn get_settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Sets one value by dot-separated key (`"display.wide_icon_aspect_ratio"`)
    /// and saves. Unknown keys and ill-typed or out-of-range values are rejected
    /// without touching the current settings.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        if key.trim().is_empty() {
            return Err(SettingsError::InvalidKey("Key cannot be empty".to_string()));
        }

        let mut tree = serde_json::to_value(&self.settings).map_err(|e| {
            SettingsError::SerializationError(format!("Failed to serialize settings: {}", e))
        })?;

        let pointer = format!("/{}", key.replace('.', "/"));
        match tree.pointer_mut(&pointer) {
            Some(slot) if !slot.is_object() => *slot = value,
            _ => {
                return Err(SettingsError::InvalidKey(format!(
                    "Key '{}' not found in settings",
                    key
                )))
            }
        }

        let updated: DashboardSettings = serde_json::from_value(tree).map_err(|e| {
            SettingsError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        Self::check_ranges(&updated)?;

        self.settings = updated;
        self.save()
    }

    /// Restores defaults and saves.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = DashboardSettings::default();
        self.save()
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}
