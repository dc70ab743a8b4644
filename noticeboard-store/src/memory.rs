//! In-process announcement backend.
//!
//! Used as the secondary backend when the host has no writable or persistent
//! filesystem. Contents live as long as the backend handle and are lost on
//! restart; every process (or test) that builds its own handle gets its own
//! collection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use noticeboard_core::error::Result;
use noticeboard_core::traits::CollectionBackend;
use noticeboard_core::types::Announcement;

/// In-memory collection keyed by announcement id.
///
/// # Thread Safety
///
/// Each `load` and `save` holds the lock for its whole duration, so a load
/// never observes half of a save. Nothing orders a load-modify-save sequence
/// against another one; callers get last-writer-wins.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Announcement>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with `announcements`.
    pub fn with_announcements(announcements: Vec<Announcement>) -> Self {
        let entries = announcements
            .into_iter()
            .map(|ann| (ann.id.clone(), ann))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Returns the number of stored announcements.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every stored announcement.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[async_trait]
impl CollectionBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip(self))]
    async fn load(&self) -> Result<Vec<Announcement>> {
        let announcements: Vec<Announcement> = self.entries.read().values().cloned().collect();
        debug!(count = announcements.len(), "Loaded announcements from memory");
        Ok(announcements)
    }

    #[instrument(skip(self, announcements), fields(count = announcements.len()))]
    async fn save(&self, announcements: &[Announcement]) -> Result<()> {
        let replacement: BTreeMap<String, Announcement> = announcements
            .iter()
            .map(|ann| (ann.id.clone(), ann.clone()))
            .collect();
        *self.entries.write() = replacement;
        debug!("Saved announcements to memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noticeboard_core::types::NewAnnouncement;

    fn make_announcement(title: &str) -> Announcement {
        Announcement::from_new(NewAnnouncement::new(title, "body"))
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.load().await.unwrap().is_empty());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_collection() {
        let backend = MemoryBackend::new();
        let first = make_announcement("first");
        let second = make_announcement("second");

        backend.save(&[first.clone(), second.clone()]).await.unwrap();
        assert_eq!(backend.len(), 2);

        backend.save(&[second.clone()]).await.unwrap();
        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, vec![second]);
    }

    #[tokio::test]
    async fn test_with_announcements() {
        let backend = MemoryBackend::with_announcements(vec![
            make_announcement("a"),
            make_announcement("b"),
        ]);
        assert_eq!(backend.len(), 2);

        backend.clear();
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_handles_are_isolated() {
        let one = MemoryBackend::new();
        let two = MemoryBackend::new();

        one.save(&[make_announcement("only in one")]).await.unwrap();

        assert_eq!(one.len(), 1);
        assert!(two.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_leave_one_whole_collection() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let backend = Arc::new(MemoryBackend::new());
        let mut tasks = JoinSet::new();

        for i in 0..20usize {
            let backend = backend.clone();
            tasks.spawn(async move {
                let batch: Vec<Announcement> =
                    (0..=i).map(|n| make_announcement(&format!("{i}-{n}"))).collect();
                backend.save(&batch).await.unwrap();
            });
        }

        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        // Whichever save landed last is present in full.
        let loaded = backend.load().await.unwrap();
        let prefix = loaded[0].title.split('-').next().unwrap().to_string();
        assert!(loaded.iter().all(|a| a.title.starts_with(&format!("{prefix}-"))));
        assert_eq!(loaded.len(), prefix.parse::<usize>().unwrap() + 1);
    }
}
