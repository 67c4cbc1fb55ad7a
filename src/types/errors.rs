use std::fmt;

// === RegistryError ===

/// Errors returned by the service registry.
///
/// Every variant is recoverable: the caller surfaces a message or ignores the
/// intent, the registry state is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A required field was missing or blank.
    Validation(String),
    /// No service with the given identifier exists.
    NotFound(String),
    /// A move destination was outside the current bounds.
    OutOfRange { position: usize, len: usize },
    /// The persistence collaborator rejected the write.
    Persistence(PersistenceError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Validation(msg) => write!(f, "Invalid service: {}", msg),
            RegistryError::NotFound(id) => write!(f, "Service not found: {}", id),
            RegistryError::OutOfRange { position, len } => {
                write!(f, "Position {} out of range for {} services", position, len)
            }
            RegistryError::Persistence(err) => write!(f, "Registry persistence error: {}", err),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersistenceError> for RegistryError {
    fn from(err: PersistenceError) -> Self {
        RegistryError::Persistence(err)
    }
}

// === PersistenceError ===

/// Errors related to durable storage of services.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// The service row to modify does not exist in storage.
    NotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::NotFound(id) => write!(f, "Stored service not found: {}", id),
            PersistenceError::DatabaseError(msg) => write!(f, "Service database error: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::DatabaseError(err.to_string())
    }
}

// === FaviconError ===

/// Errors related to favicon retrieval.
///
/// These never reach the registry; callers degrade to the placeholder icon.
#[derive(Debug, Clone, PartialEq)]
pub enum FaviconError {
    /// The input could not be turned into a fetchable URL.
    InvalidUrl(String),
    /// The HTTP request failed or returned a non-success status.
    NetworkError(String),
    /// The response body was empty or not a decodable image.
    DecodeError(String),
}

impl fmt::Display for FaviconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaviconError::InvalidUrl(url) => write!(f, "Invalid favicon URL: {}", url),
            FaviconError::NetworkError(msg) => write!(f, "Favicon network error: {}", msg),
            FaviconError::DecodeError(msg) => write!(f, "Favicon decode error: {}", msg),
        }
    }
}

impl std::error::Error for FaviconError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
