pub mod clock;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod locks;
pub mod logger;
pub mod models;
pub mod store;


use std::sync::Arc;

use clock::{Clock, SystemClock};
use commands::{
    bookings::BookingLedger, invoices::Invoices, reports::Reports, rooms::RoomInventory,
    service_orders::ServiceOrders, tasks::TaskTracker, Stores,
};
use config::Config;
use db::Database;
use error::Result;
use locks::RecordLocks;

/// All trackers wired to one set of stores, one clock and shared lock registries.
pub struct Desk {
    pub rooms: RoomInventory,
    pub bookings: BookingLedger,
    pub service_orders: ServiceOrders,
    pub invoices: Invoices,
    pub tasks: TaskTracker,
    pub reports: Reports,
}

impl Desk {
    /// Open (and create or migrate) the SQLite database named by the config.
    pub fn open(config: &Config) -> Result<Self> {
        let db = Database::new(&config.database_path)?;
        db.initialize()?;
        tracing::info!(path = %config.database_path.display(), "database ready");

        Ok(Self::with_stores(Stores::sqlite(Arc::new(db)), Arc::new(SystemClock)))
    }

    pub fn in_memory() -> Self {
        Self::with_stores(Stores::in_memory(), Arc::new(SystemClock))
    }

    pub fn with_stores(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        let room_locks = Arc::new(RecordLocks::new());
        let order_locks = Arc::new(RecordLocks::new());

        Desk {
            rooms: RoomInventory::new(&stores, Arc::clone(&room_locks), Arc::clone(&clock)),
            bookings: BookingLedger::new(&stores, room_locks, Arc::clone(&clock)),
            service_orders: ServiceOrders::new(&stores, Arc::clone(&order_locks), Arc::clone(&clock)),
            invoices: Invoices::new(&stores, order_locks, Arc::clone(&clock)),
            tasks: TaskTracker::new(&stores, clock),
            reports: Reports::new(&stores),
        }
    }
}
