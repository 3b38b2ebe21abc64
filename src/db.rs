use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::StoreError;

/// Entity tables. Each row holds the record's JSON document keyed by its id.
pub const TABLES: [&str; 5] = ["rooms", "bookings", "service_orders", "invoices", "staff_tasks"];

pub fn table_for(kind: &str) -> String {
    format!("{kind}s")
}

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::debug!(path = %db_path.display(), "opened database");

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Database {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;

        for table in TABLES {
            conn.execute_batch(&format!(
                "
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    data TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
                );
                "
            ))?;
        }

        // Pass the held connection to avoid re-locking
        Self::migrate_conn(&conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<(), StoreError> {
        for table in TABLES {
            let columns: Vec<String> = conn
                .prepare(&format!("PRAGMA table_info({table})"))?
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<Result<Vec<_>, _>>()?;

            if !columns.iter().any(|c| c == "updated_at") {
                tracing::info!(table, "adding updated_at column");
                conn.execute(
                    &format!("ALTER TABLE {table} ADD COLUMN updated_at DATETIME"),
                    [],
                )?;
            }
        }

        Ok(())
    }
}
