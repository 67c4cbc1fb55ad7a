//! App core for the dashboard.
//!
//! `App` owns every long-lived component and is handed explicitly to
//! whatever needs it; nothing in the crate reaches for a global instance.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::database::connection::Database;
use crate::managers::service_registry::ServiceRegistry;
use crate::platform;
use crate::services::favicon_fetcher::FaviconFetcher;
use crate::services::persistence_client::PersistenceClient;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::event::ServiceEvent;
use crate::types::icon::IconDisplayPolicy;
use crate::types::service::Service;

pub struct App {
    pub db: Arc<Database>,
    pub registry: ServiceRegistry<PersistenceClient>,
    pub settings_engine: SettingsEngine,
    pub favicon_fetcher: FaviconFetcher,
    recent_events: Rc<RefCell<Vec<ServiceEvent>>>,
}

impl App {
    /// Loads settings from the platform config dir and opens the database
    /// named there, relative to the platform data dir.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(None);
        settings_engine.load()?;

        let db_path = Self::resolve_db_path(
            &platform::get_data_dir(),
            &settings_engine.get_settings().storage.database_file,
        );
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&db_path)?;
        Self::with_parts(db, settings_engine)
    }

    /// Assembles an app from an already-open database and settings engine.
    pub fn with_parts(
        db: Database,
        settings_engine: SettingsEngine,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(db);
        let favicon_fetcher = FaviconFetcher::new(&settings_engine.get_settings().network)?;
        let mut registry = ServiceRegistry::open(PersistenceClient::new(db.clone()))?;

        let recent_events = Rc::new(RefCell::new(Vec::new()));
        registry.subscribe(Box::new(recent_events.clone()));

        Ok(Self {
            db,
            registry,
            settings_engine,
            favicon_fetcher,
            recent_events,
        })
    }

    /// Relative database names live in `data_dir`; absolute ones are used as-is.
    pub fn resolve_db_path(data_dir: &Path, database_file: &str) -> PathBuf {
        let file = Path::new(database_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            data_dir.join(file)
        }
    }

    /// Events emitted since the last call, oldest first.
    pub fn drain_events(&self) -> Vec<ServiceEvent> {
        self.recent_events.borrow_mut().drain(..).collect()
    }

    pub fn icon_policy(&self) -> IconDisplayPolicy {
        IconDisplayPolicy::new(self.settings_engine.get_settings().display.wide_icon_aspect_ratio)
    }

    /// Whether `service` counts as online recently under the current settings.
    pub fn is_online_recently(&self, service: &Service) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let window = self
            .settings_engine
            .get_settings()
            .display
            .online_recently_window_secs;
        service.was_online_recently(now, window)
    }
}
