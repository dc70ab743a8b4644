//! Error types for the noticeboard.
//!
//! One taxonomy runs from the storage backends up to the HTTP layer. Backend
//! causes (`IoError`, `JsonError`, `HttpError`, `KvError`, `CorruptCollection`)
//! never escape the store on their own: the store wraps them in `ReadError`
//! or `WriteError` together with the name of the backend that failed.

use thiserror::Error;

/// Result type alias using `BoardError`.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Main error type for all noticeboard operations.
#[derive(Debug, Error)]
pub enum BoardError {
    // ═══════════════════════════════════════════════════════════════════════════
    // AUTHORIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// A required secret or setting is absent. Needs operator action.
    #[error("Server misconfiguration: {0}")]
    ServerMisconfigured(String),

    /// Credential missing or incorrect.
    #[error("Unauthorized")]
    Unauthorized,

    // ═══════════════════════════════════════════════════════════════════════════
    // STORE
    // ═══════════════════════════════════════════════════════════════════════════

    /// No announcement has the given id.
    #[error("Announcement not found: {0}")]
    NotFound(String),

    /// The active read backend failed.
    #[error("Failed to read announcements from {backend}: {source}")]
    ReadError {
        /// Backend that failed
        backend: &'static str,
        /// Underlying cause
        source: Box<BoardError>,
    },

    /// Every write target failed.
    #[error("Failed to write announcements to {backend}: {source}")]
    WriteError {
        /// Backend that failed last
        backend: &'static str,
        /// Underlying cause
        source: Box<BoardError>,
    },

    /// The stored value exists but is not a list of announcements.
    #[error("Stored collection is corrupt: {0}")]
    CorruptCollection(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // BACKEND CAUSES
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP transport failure talking to the key-value service.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The key-value service answered with an error.
    #[error("Key-value service error (status {status}): {message}")]
    KvError {
        /// HTTP status returned by the service
        status: u16,
        /// Error text from the response body
        message: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT / CONFIG
    // ═══════════════════════════════════════════════════════════════════════════

    /// Payload shape, type, or content is invalid.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A configuration value could not be used.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardError {
    /// Wraps a backend failure as a read error.
    pub fn read(backend: &'static str, cause: BoardError) -> Self {
        BoardError::ReadError {
            backend,
            source: Box::new(cause),
        }
    }

    /// Wraps a backend failure as a write error.
    pub fn write(backend: &'static str, cause: BoardError) -> Self {
        BoardError::WriteError {
            backend,
            source: Box::new(cause),
        }
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BoardError::NotFound(_))
    }

    /// Returns true if this is a backend I/O failure surfaced by the store.
    pub fn is_backend_error(&self) -> bool {
        matches!(
            self,
            BoardError::ReadError { .. } | BoardError::WriteError { .. }
        )
    }

    /// Returns true if the caller can fix this by resupplying credentials.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, BoardError::Unauthorized)
    }

    /// Returns true if this is an input validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, BoardError::ValidationError(_))
    }
}
