pub mod billing;
pub mod bookings;
pub mod invoices;
pub mod reports;
pub mod rooms;
pub mod service_orders;
pub mod tasks;

use std::sync::Arc;

use crate::db::Database;
use crate::error::{DeskError, Result};
use crate::models::{Booking, Invoice, RecordId, Room, ServiceOrder, StaffTask};
use crate::store::{MemoryStore, Record, SqliteStore, Store};

/// One store per entity, shared by the trackers that read them.
#[derive(Clone)]
pub struct Stores {
    pub rooms: Arc<dyn Store<Room>>,
    pub bookings: Arc<dyn Store<Booking>>,
    pub service_orders: Arc<dyn Store<ServiceOrder>>,
    pub invoices: Arc<dyn Store<Invoice>>,
    pub tasks: Arc<dyn Store<StaffTask>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Stores {
            rooms: Arc::new(MemoryStore::new()),
            bookings: Arc::new(MemoryStore::new()),
            service_orders: Arc::new(MemoryStore::new()),
            invoices: Arc::new(MemoryStore::new()),
            tasks: Arc::new(MemoryStore::new()),
        }
    }

    pub fn sqlite(db: Arc<Database>) -> Self {
        Stores {
            rooms: Arc::new(SqliteStore::new(Arc::clone(&db))),
            bookings: Arc::new(SqliteStore::new(Arc::clone(&db))),
            service_orders: Arc::new(SqliteStore::new(Arc::clone(&db))),
            invoices: Arc::new(SqliteStore::new(Arc::clone(&db))),
            tasks: Arc::new(SqliteStore::new(db)),
        }
    }
}

/// Load a record or report it as not found.
pub(crate) fn fetch<T: Record>(store: &dyn Store<T>, id: RecordId) -> Result<T> {
    store
        .get(id)?
        .ok_or_else(|| DeskError::not_found(T::KIND, id))
}
