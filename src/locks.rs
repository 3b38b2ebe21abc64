use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::RecordId;

/// Per-record mutual exclusion for read-check-write sequences.
///
/// The booking ledger and the room inventory share one registry keyed by room
/// id, so an approval, a check-in and a manual status change on the same room
/// never interleave. Service orders and invoices use the same type keyed by
/// their own ids. Different keys proceed independently.
#[derive(Default)]
pub struct RecordLocks {
    records: Mutex<HashMap<RecordId, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, id: RecordId) -> Arc<Mutex<()>> {
        // The registry map and the unit guards hold no invariants a panic could break
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.entry(id).or_default().clone()
    }

    /// Run `f` while holding the lock for `id`.
    pub fn with_record<T>(&self, id: RecordId, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }
}
