//! Shared replacer state.

use std::collections::{
    HashMap,
    HashSet,
};
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
};

use crate::host::FragmentId;
use crate::table::SharedTable;

/// State shared by every handle to one replacer.
///
/// # Lock order
///
/// When both are needed, take `export_lock` before `processed`.
#[derive(Clone, Default)]
pub struct ReplacerState {
    /// Current translation table.
    pub table: SharedTable,
    /// Set while a scan cycle is running.
    busy: Arc<AtomicBool>,
    /// Text the replacer last applied to each fragment.
    processed: Arc<Mutex<HashMap<FragmentId, String>>>,
    /// Serializes load-merge-save of the export corpus.
    export_lock: Arc<Mutex<()>>,
}

impl ReplacerState {
    #[must_use]
    pub fn new(table: SharedTable) -> Self {
        Self { table, ..Self::default() }
    }

    /// Marks a cycle as running. Returns `None` if one already is.
    #[must_use]
    pub fn try_begin(&self) -> Option<CycleGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard { busy: Arc::clone(&self.busy) })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// `true` if `text` is exactly what the replacer last wrote into `id`.
    #[must_use]
    pub fn is_own_output(&self, id: FragmentId, text: &str) -> bool {
        self.lock_processed().get(&id).is_some_and(|applied| applied == text)
    }

    /// Records that `text` was applied to `id`.
    pub fn mark_applied(&self, id: FragmentId, text: &str) {
        self.lock_processed().insert(id, text.to_string());
    }

    /// Forgets what was applied to `id`.
    pub fn forget(&self, id: FragmentId) {
        self.lock_processed().remove(&id);
    }

    /// Forgets every fragment not in `live`, e.g. ids the host destroyed.
    pub fn retain_processed(&self, live: &HashSet<FragmentId>) {
        self.lock_processed().retain(|id, _| live.contains(id));
    }

    /// Number of fragments currently tracked.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.lock_processed().len()
    }

    /// Clears per-fragment tracking, e.g. after the host switched context.
    pub fn clear_processed(&self) {
        self.lock_processed().clear();
    }

    /// Acquires the export lock.
    pub fn lock_export(&self) -> MutexGuard<'_, ()> {
        self.export_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Acquires the processed map, recovering from poisoning.
    fn lock_processed(&self) -> MutexGuard<'_, HashMap<FragmentId, String>> {
        self.processed.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ReplacerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplacerState")
            .field("table", &"<SharedTable>")
            .field("busy", &self.is_busy())
            .field("processed", &self.processed_count())
            .finish_non_exhaustive()
    }
}

/// Clears the busy flag when dropped.
#[derive(Debug)]
pub struct CycleGuard {
    /// Flag owned by the state this guard came from.
    busy: Arc<AtomicBool>,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
