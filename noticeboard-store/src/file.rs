//! File-based announcement backend.
//!
//! Stores the collection as a pretty-printed JSON array. The file and its
//! parent directory are created, holding `[]`, the first time they are
//! touched. Every load reads the file afresh; nothing is cached in memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use noticeboard_core::constants::EMPTY_COLLECTION_JSON;
use noticeboard_core::error::Result;
use noticeboard_core::traits::CollectionBackend;
use noticeboard_core::types::Announcement;

use crate::codec::{decode_collection, encode_collection};

/// File-based announcement backend.
///
/// # File Format
///
/// ```text
/// [
///   {"id": "...", "title": "...", "body": "...", "publishedAt": "...", "highlight": false},
///   ...
/// ]
/// ```
///
/// No envelope and no schema version.
#[derive(Debug)]
pub struct FileBackend {
    /// Path to the JSON file
    path: PathBuf,
    /// Distinguishes temp files of overlapping saves
    save_seq: AtomicU64,
}

impl FileBackend {
    /// Creates a backend for `path`. Nothing is read or created until first use.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            save_seq: AtomicU64::new(0),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file holding an empty collection if it does not exist yet.
    async fn ensure_file(&self) -> Result<()> {
        match fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.ensure_parent().await?;
                fs::write(&self.path, EMPTY_COLLECTION_JSON).await?;
                warn!(path = ?self.path, "Announcements file missing, created an empty one");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let seq = self.save_seq.fetch_add(1, Ordering::SeqCst);
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), seq));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CollectionBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    #[instrument(skip(self), fields(path = ?self.path))]
    async fn load(&self) -> Result<Vec<Announcement>> {
        self.ensure_file().await?;
        let contents = fs::read_to_string(&self.path).await?;
        let announcements = decode_collection(&contents)?;
        debug!(count = announcements.len(), "Loaded announcements from file");
        Ok(announcements)
    }

    #[instrument(skip(self, announcements), fields(path = ?self.path, count = announcements.len()))]
    async fn save(&self, announcements: &[Announcement]) -> Result<()> {
        self.ensure_parent().await?;
        let contents = encode_collection(announcements)?;

        // Write atomically (write to temp, then rename)
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!("Saved announcements to file");
        Ok(())
    }
}
