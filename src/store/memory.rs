use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{Record, Store};
use crate::error::StoreError;
use crate::models::RecordId;

struct Table<T> {
    next_id: RecordId,
    rows: BTreeMap<RecordId, T>,
}

/// In-process store used by tests and `Desk::in_memory`.
pub struct MemoryStore<T> {
    table: Mutex<Table<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        MemoryStore {
            table: Mutex::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Store<T> for MemoryStore<T> {
    fn list(&self) -> Result<Vec<T>, StoreError> {
        let table = self.table.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.values().cloned().collect())
    }

    fn get(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        let table = self.table.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    fn insert(&self, mut record: T) -> Result<T, StoreError> {
        let mut table = self.table.lock().map_err(|_| StoreError::Poisoned)?;
        let id = table.next_id;
        table.next_id += 1;
        record.set_id(id);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, record: &T) -> Result<(), StoreError> {
        let mut table = self.table.lock().map_err(|_| StoreError::Poisoned)?;
        match table.rows.get_mut(&record.id()) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(StoreError::Missing {
                kind: T::KIND,
                id: record.id(),
            }),
        }
    }

    fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        let mut table = self.table.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.remove(&id).is_some())
    }
}
