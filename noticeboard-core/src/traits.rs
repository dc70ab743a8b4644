//! Storage seam shared by every backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Announcement;

// ═══════════════════════════════════════════════════════════════════════════════
// BACKEND TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A place the whole announcement collection can be loaded from and saved to.
///
/// Backends are whole-collection stores: there is no partial or append path.
/// Implementations in `noticeboard-store`:
/// - in-process mapping (no persistent filesystem)
/// - JSON file on disk
/// - REST key-value service (durable, shared across instances)
///
/// A backend that has never been written must load as an empty collection,
/// not as an error.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// Short name used in logs and error messages (e.g. `"kv"`, `"file"`).
    fn name(&self) -> &'static str;

    /// Loads every stored announcement, in no particular order.
    async fn load(&self) -> Result<Vec<Announcement>>;

    /// Replaces the stored collection with `announcements`.
    async fn save(&self, announcements: &[Announcement]) -> Result<()>;
}
