//! Record storage behind the trackers.
//!
//! Every tracker works against `Arc<dyn Store<T>>`, so the same logic runs on
//! SQLite in the application and on a plain map in tests.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::RecordId;

pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Entity name, also used as the SQLite table stem.
    const KIND: &'static str;

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);
}

pub trait Store<T: Record>: Send + Sync {
    /// All records in ascending id order.
    fn list(&self) -> Result<Vec<T>, StoreError>;

    fn get(&self, id: RecordId) -> Result<Option<T>, StoreError>;

    /// Assigns a fresh id, persists the record and returns it.
    fn insert(&self, record: T) -> Result<T, StoreError>;

    /// Replaces an existing record. Fails with `StoreError::Missing` if the id is unknown.
    fn update(&self, record: &T) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    fn delete(&self, id: RecordId) -> Result<bool, StoreError>;
}
