//! Tracking of writes that landed on the fallback backend only.
//!
//! After such a write the durable backend no longer holds what the store
//! reported as saved. Reads keep coming from the durable backend, so the
//! divergence persists until the next successful durable write.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// One write that failed on the durable backend and succeeded on the fallback.
#[derive(Clone, Debug, Serialize)]
pub struct Divergence {
    /// When the fallback write happened
    pub at: DateTime<Utc>,
    /// Store operation that wrote (`create`, `update`, `delete`)
    pub operation: &'static str,
    /// Backend whose write failed
    pub durable_backend: &'static str,
    /// Backend that took the write instead
    pub fallback_backend: &'static str,
    /// Durable backend error text
    pub error: String,
}

/// Snapshot of divergence counters.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DivergenceStatus {
    /// Writes that went to the fallback backend since the store was built
    pub fallback_writes: u64,
    /// Most recent such write
    pub last: Option<Divergence>,
}

impl DivergenceStatus {
    /// True if any write has gone to the fallback backend.
    pub fn is_diverged(&self) -> bool {
        self.fallback_writes > 0
    }
}

/// Callback invoked on every fallback write.
pub type DivergenceHook = Box<dyn Fn(&Divergence) + Send + Sync>;

#[derive(Default)]
pub(crate) struct DivergenceTracker {
    count: AtomicU64,
    last: RwLock<Option<Divergence>>,
    hook: Option<DivergenceHook>,
}

impl DivergenceTracker {
    pub(crate) fn set_hook(&mut self, hook: DivergenceHook) {
        self.hook = Some(hook);
    }

    pub(crate) fn record(&self, divergence: Divergence) {
        self.count.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = &self.hook {
            hook(&divergence);
        }
        *self.last.write() = Some(divergence);
    }

    pub(crate) fn status(&self) -> DivergenceStatus {
        DivergenceStatus {
            fallback_writes: self.count.load(Ordering::SeqCst),
            last: self.last.read().clone(),
        }
    }
}

impl std::fmt::Debug for DivergenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DivergenceTracker")
            .field("count", &self.count)
            .field("last", &*self.last.read())
            .field("hook", &self.hook.is_some())
            .finish()
    }
}
