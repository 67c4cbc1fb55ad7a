// Dashboard services
// Collaborators of the registry (storage, favicon fetch) and settings.

pub mod favicon_fetcher;
pub mod persistence_client;
pub mod settings_engine;
