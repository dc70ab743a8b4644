//! Store configuration and backend selection.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use noticeboard_core::constants::*;
use noticeboard_core::error::{BoardError, Result};
use noticeboard_core::traits::CollectionBackend;

use crate::file::FileBackend;
use crate::kv::{KvBackend, KvConfig};
use crate::memory::MemoryBackend;
use crate::store::AnnouncementStore;

/// Where the secondary backend keeps its data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecondaryKind {
    /// In-process mapping, lost on restart
    Memory,
    /// JSON file at the given path
    File(PathBuf),
}

/// Everything needed to build an [`AnnouncementStore`].
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Durable backend settings; `None` when not configured
    pub kv: Option<KvConfig>,
    /// Path of the secondary JSON file
    pub data_file: PathBuf,
    /// True when the host has no writable or persistent filesystem
    pub ephemeral_fs: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kv: None,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            ephemeral_fs: false,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let kv = match (non_empty(ENV_KV_URL), non_empty(ENV_KV_TOKEN)) {
            (Some(url), Some(token)) => {
                let mut kv = KvConfig::new(url, token);
                if let Some(key) = non_empty(ENV_KV_KEY) {
                    kv = kv.with_key(key.trim());
                }
                if let Some(raw) = non_empty(ENV_KV_TIMEOUT_SECS) {
                    let seconds = raw.trim().parse::<u64>().map_err(|_| {
                        BoardError::ConfigError(format!(
                            "{ENV_KV_TIMEOUT_SECS} must be a whole number of seconds, got {raw:?}"
                        ))
                    })?;
                    kv = kv.with_timeout(seconds);
                }
                Some(kv)
            }
            _ => None,
        };

        let data_file = non_empty(ENV_DATA_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let forced = non_empty(ENV_EPHEMERAL_FS)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let ephemeral_fs = forced || non_empty(ENV_SERVERLESS_MARKER).is_some();

        Ok(Self {
            kv,
            data_file,
            ephemeral_fs,
        })
    }

    /// Uses a different secondary file.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Which secondary backend this config selects.
    pub fn secondary_kind(&self) -> SecondaryKind {
        if self.ephemeral_fs {
            SecondaryKind::Memory
        } else {
            SecondaryKind::File(self.data_file.clone())
        }
    }

    /// Builds the store described by this config.
    pub fn build(&self) -> Result<AnnouncementStore> {
        let secondary: Arc<dyn CollectionBackend> = match self.secondary_kind() {
            SecondaryKind::Memory => Arc::new(MemoryBackend::new()),
            SecondaryKind::File(path) => Arc::new(FileBackend::new(path)),
        };

        let mut store = AnnouncementStore::new(secondary);
        if let Some(kv) = &self.kv {
            store = store.with_durable(Arc::new(KvBackend::new(kv.clone())?));
        }

        info!(backends = %store.backend_summary(), "Announcement store ready");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.kv.is_none());
        assert_eq!(config.secondary_kind(), SecondaryKind::File(PathBuf::from(DEFAULT_DATA_FILE)));
    }

    #[test]
    fn test_kv_needs_url_and_token() {
        let only_url = StoreConfig::from_lookup(lookup(&[(ENV_KV_URL, "https://kv.example.com")])).unwrap();
        assert!(only_url.kv.is_none());

        let blank_token = StoreConfig::from_lookup(lookup(&[
            (ENV_KV_URL, "https://kv.example.com"),
            (ENV_KV_TOKEN, "  "),
        ]))
        .unwrap();
        assert!(blank_token.kv.is_none());

        let both = StoreConfig::from_lookup(lookup(&[
            (ENV_KV_URL, "https://kv.example.com"),
            (ENV_KV_TOKEN, "secret"),
            (ENV_KV_KEY, "board"),
            (ENV_KV_TIMEOUT_SECS, "3"),
        ]))
        .unwrap();
        let kv = both.kv.unwrap();
        assert_eq!(kv.key, "board");
        assert_eq!(kv.timeout_seconds, 3);
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let err = StoreConfig::from_lookup(lookup(&[
            (ENV_KV_URL, "https://kv.example.com"),
            (ENV_KV_TOKEN, "secret"),
            (ENV_KV_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(_)));
    }

    #[test]
    fn test_serverless_host_uses_memory() {
        let config = StoreConfig::from_lookup(lookup(&[(ENV_SERVERLESS_MARKER, "1")])).unwrap();
        assert_eq!(config.secondary_kind(), SecondaryKind::Memory);

        let forced = StoreConfig::from_lookup(lookup(&[(ENV_EPHEMERAL_FS, "true")])).unwrap();
        assert_eq!(forced.secondary_kind(), SecondaryKind::Memory);

        let off = StoreConfig::from_lookup(lookup(&[(ENV_EPHEMERAL_FS, "0")])).unwrap();
        assert!(matches!(off.secondary_kind(), SecondaryKind::File(_)));
    }

    #[test]
    fn test_build_summaries() {
        let memory = StoreConfig {
            ephemeral_fs: true,
            ..StoreConfig::default()
        };
        assert_eq!(memory.build().unwrap().backend_summary(), "memory");

        let durable = StoreConfig {
            kv: Some(KvConfig::new("https://kv.example.com", "secret")),
            ..StoreConfig::default()
        };
        assert_eq!(durable.build().unwrap().backend_summary(), "kv -> file");
    }

    #[test]
    fn test_build_rejects_bad_kv_url() {
        let config = StoreConfig {
            kv: Some(KvConfig::new("::not a url::", "secret")),
            ..StoreConfig::default()
        };
        assert!(config.build().is_err());
    }

    #[tokio::test]
    async fn test_built_file_store_initializes_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("announcements.json");
        let store = StoreConfig::default().with_data_file(&path).build().unwrap();

        assert!(!path.exists());
        assert!(store.list().await.unwrap().is_empty());
        assert!(path.exists());
    }
}
