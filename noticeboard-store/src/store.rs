//! The announcement store: the feed's single source of truth.
//!
//! # Backend policy
//!
//! - With a durable backend configured, every load goes to it. A failed load
//!   is a `ReadError`; reads never fall back.
//! - Every save tries the durable backend first. If that fails the collection
//!   is saved to the secondary backend instead, a warning is logged and the
//!   divergence is recorded. The save counts as successful.
//! - Without a durable backend, the secondary backend takes all traffic.
//!
//! Mutations load the whole collection, change it in memory and save the
//! whole collection. Nothing serializes concurrent mutations: the last save
//! wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use noticeboard_core::error::{BoardError, Result};
use noticeboard_core::traits::CollectionBackend;
use noticeboard_core::types::{Announcement, AnnouncementPatch, NewAnnouncement};
use uuid::Uuid;

use crate::divergence::{Divergence, DivergenceHook, DivergenceStatus, DivergenceTracker};

/// Unordered collection keyed by id. Feed order is derived on read.
struct Collection(BTreeMap<String, Announcement>);

impl Collection {
    fn from_records(records: Vec<Announcement>) -> Self {
        let stored = records.len();
        let map: BTreeMap<_, _> = records.into_iter().map(|ann| (ann.id.clone(), ann)).collect();
        if stored > map.len() {
            warn!(
                stored,
                unique = map.len(),
                "Stored collection has duplicate ids; the next write keeps one record per id"
            );
        }
        Self(map)
    }

    fn records(&self) -> Vec<Announcement> {
        self.0.values().cloned().collect()
    }

    /// Most recent first. Equal timestamps keep no particular order.
    fn into_feed(self) -> Vec<Announcement> {
        let mut feed: Vec<Announcement> = self.0.into_values().collect();
        feed.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        feed
    }
}

/// Announcement store over a secondary backend and an optional durable one.
///
/// Build one per process and share it (e.g. behind an `Arc`) with every
/// request handler.
pub struct AnnouncementStore {
    durable: Option<Arc<dyn CollectionBackend>>,
    secondary: Arc<dyn CollectionBackend>,
    divergence: DivergenceTracker,
}

impl AnnouncementStore {
    /// Creates a store that only uses `secondary`.
    pub fn new(secondary: Arc<dyn CollectionBackend>) -> Self {
        Self {
            durable: None,
            secondary,
            divergence: DivergenceTracker::default(),
        }
    }

    /// Puts a durable backend in front of the secondary one.
    pub fn with_durable(mut self, durable: Arc<dyn CollectionBackend>) -> Self {
        self.durable = Some(durable);
        self
    }

    /// Installs a callback run on every write that falls back.
    pub fn with_divergence_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Divergence) + Send + Sync + 'static,
    {
        let hook: DivergenceHook = Box::new(hook);
        self.divergence.set_hook(hook);
        self
    }

    /// Describes the backends in use, e.g. `"kv -> file"` or `"memory"`.
    pub fn backend_summary(&self) -> String {
        match &self.durable {
            Some(durable) => format!("{} -> {}", durable.name(), self.secondary.name()),
            None => self.secondary.name().to_string(),
        }
    }

    /// Returns fallback-write counters.
    pub fn divergence(&self) -> DivergenceStatus {
        self.divergence.status()
    }

    fn read_backend(&self) -> &Arc<dyn CollectionBackend> {
        self.durable.as_ref().unwrap_or(&self.secondary)
    }

    async fn load(&self) -> Result<Collection> {
        let backend = self.read_backend();
        let records = backend
            .load()
            .await
            .map_err(|e| BoardError::read(backend.name(), e))?;
        Ok(Collection::from_records(records))
    }

    async fn persist(&self, operation: &'static str, collection: &Collection) -> Result<()> {
        let records = collection.records();

        if let Some(durable) = &self.durable {
            let durable_err = match durable.save(&records).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            warn!(
                operation,
                durable = durable.name(),
                fallback = self.secondary.name(),
                error = %durable_err,
                "Durable write failed, writing to fallback backend"
            );

            self.secondary
                .save(&records)
                .await
                .map_err(|e| BoardError::write(self.secondary.name(), e))?;

            self.divergence.record(Divergence {
                at: chrono::Utc::now(),
                operation,
                durable_backend: durable.name(),
                fallback_backend: self.secondary.name(),
                error: durable_err.to_string(),
            });
            return Ok(());
        }

        self.secondary
            .save(&records)
            .await
            .map_err(|e| BoardError::write(self.secondary.name(), e))
    }

    /// Returns every announcement, most recent `published_at` first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Announcement>> {
        let feed = self.load().await?.into_feed();
        debug!(count = feed.len(), "Listed announcements");
        Ok(feed)
    }

    /// Returns one announcement.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Announcement> {
        let collection = self.load().await?;
        collection
            .0
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    /// Creates an announcement and returns it.
    ///
    /// Title and body are trimmed; `highlight` defaults to `false` and
    /// `published_at` to now. Duplicate titles are allowed.
    #[instrument(skip(self, new))]
    pub async fn create(&self, new: NewAnnouncement) -> Result<Announcement> {
        let mut collection = self.load().await?;

        let mut entry = Announcement::from_new(new);
        while collection.0.contains_key(&entry.id) {
            entry.id = Uuid::new_v4().to_string();
        }

        collection.0.insert(entry.id.clone(), entry.clone());
        self.persist("create", &collection).await?;

        info!(id = %entry.id, "Created announcement");
        Ok(entry)
    }

    /// Applies the fields present in `patch` to announcement `id`.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: AnnouncementPatch) -> Result<Announcement> {
        let mut collection = self.load().await?;

        let entry = collection
            .0
            .get_mut(id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        entry.apply(patch);
        let updated = entry.clone();

        self.persist("update", &collection).await?;

        info!(id, "Updated announcement");
        Ok(updated)
    }

    /// Removes announcement `id`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut collection = self.load().await?;

        let before = collection.0.len();
        collection.0.remove(id);
        if collection.0.len() == before {
            return Err(BoardError::NotFound(id.to_string()));
        }

        self.persist("delete", &collection).await?;

        info!(id, "Deleted announcement");
        Ok(())
    }
}

impl std::fmt::Debug for AnnouncementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnouncementStore")
            .field("backends", &self.backend_summary())
            .field("divergence", &self.divergence)
            .finish()
    }
}
