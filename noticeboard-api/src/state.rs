//! App state: admin gate, announcement store, config.

use std::sync::Arc;
use std::time::Instant;

use noticeboard_core::constants::{DEFAULT_MAX_BODY_BYTES, ENV_ADMIN_TOKEN, ENV_MAX_BODY_BYTES};
use noticeboard_core::error::{BoardError, Result};
use noticeboard_store::{AnnouncementStore, StoreConfig};

use crate::auth::AdminGate;

/// Server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Shared admin secret
    pub admin_token: Option<String>,
    /// Store backends
    pub store: StoreConfig,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            admin_token: None,
            store: StoreConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ApiConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let max_body_bytes = match std::env::var(ENV_MAX_BODY_BYTES) {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                BoardError::ConfigError(format!("{ENV_MAX_BODY_BYTES} must be a byte count, got {raw:?}"))
            })?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            admin_token: std::env::var(ENV_ADMIN_TOKEN).ok(),
            store: StoreConfig::from_env()?,
            max_body_bytes,
        })
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("admin_token", &self.admin_token.as_ref().map(|_| "<redacted>"))
            .field("store", &self.store)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

/// Shared state behind every handler.
#[derive(Debug)]
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Admin token check
    pub gate: AdminGate,
    /// Announcement store
    pub store: Arc<AnnouncementStore>,
    /// Server start, for uptime
    pub started_at: Instant,
}

impl AppState {
    /// Builds the gate and the store from `config`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let store = Arc::new(config.store.build()?);
        Ok(Self::with_store(config, store))
    }

    /// Uses an already built store.
    pub fn with_store(config: ApiConfig, store: Arc<AnnouncementStore>) -> Self {
        Self {
            gate: AdminGate::new(config.admin_token.clone()),
            config,
            store,
            started_at: Instant::now(),
        }
    }
}
