use std::marker::PhantomData;
use std::sync::Arc;

use rusqlite::OptionalExtension;

use super::{Record, Store};
use crate::db::{table_for, Database};
use crate::error::StoreError;
use crate::models::RecordId;

/// Store persisting each record as a JSON document in its entity table.
pub struct SqliteStore<T> {
    db: Arc<Database>,
    table: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> SqliteStore<T> {
    pub fn new(db: Arc<Database>) -> Self {
        SqliteStore {
            db,
            table: table_for(T::KIND),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Store<T> for SqliteStore<T> {
    fn list(&self) -> Result<Vec<T>, StoreError> {
        let conn = self.db.lock()?;

        let mut stmt = conn.prepare(&format!("SELECT data FROM {} ORDER BY id", self.table))?;
        let docs = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        docs.iter()
            .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
            .collect()
    }

    fn get(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        let conn = self.db.lock()?;

        let doc: Option<String> = conn
            .query_row(
                &format!("SELECT data FROM {} WHERE id = ?1", self.table),
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match doc {
            Some(doc) => Ok(Some(serde_json::from_str(&doc)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, mut record: T) -> Result<T, StoreError> {
        let conn = self.db.lock()?;
        // Dropping the transaction on an early return rolls back the reserved row
        let tx = conn.unchecked_transaction()?;

        // Reserve the row first so the stored document carries its own id
        tx.execute(
            &format!("INSERT INTO {} (data) VALUES ('{{}}')", self.table),
            [],
        )?;
        let id = tx.last_insert_rowid();
        record.set_id(id);

        tx.execute(
            &format!("UPDATE {} SET data = ?1 WHERE id = ?2", self.table),
            rusqlite::params![serde_json::to_string(&record)?, id],
        )?;
        tx.commit()?;
        tracing::debug!(kind = T::KIND, id, "inserted record");

        Ok(record)
    }

    fn update(&self, record: &T) -> Result<(), StoreError> {
        let conn = self.db.lock()?;

        conn.execute(
            &format!(
                "UPDATE {} SET data = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                self.table
            ),
            rusqlite::params![serde_json::to_string(record)?, record.id()],
        )?;

        if conn.changes() == 0 {
            return Err(StoreError::Missing {
                kind: T::KIND,
                id: record.id(),
            });
        }

        Ok(())
    }

    fn delete(&self, id: RecordId) -> Result<bool, StoreError> {
        let conn = self.db.lock()?;

        let removed = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", self.table), [id])?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StaffTask, TaskPriority, TaskStatus};
    use chrono::{NaiveDate, Utc};

    fn store() -> SqliteStore<StaffTask> {
        SqliteStore::new(database())
    }

    fn database() -> Arc<Database> {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        Arc::new(db)
    }

    fn task(title: &str) -> StaffTask {
        StaffTask {
            id: 0,
            title: title.into(),
            assignee: "Lan".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
            priority: TaskPriority::High,
            status: TaskStatus::Todo,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_assigns_id_and_persists_it() {
        let store = store();
        let saved = store.insert(task("Replace towels")).unwrap();
        assert_eq!(saved.id, 1);

        let loaded = store.get(saved.id).unwrap().unwrap();
        assert_eq!(loaded, saved);
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let store = store();
        store.insert(task("First")).unwrap();
        store.insert(task("Second")).unwrap();
        let titles: Vec<String> = store.list().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_update_and_delete() {
        let store = store();
        let mut saved = store.insert(task("Fix lamp")).unwrap();
        saved.status = TaskStatus::InProgress;
        store.update(&saved).unwrap();
        assert_eq!(store.get(saved.id).unwrap().unwrap().status, TaskStatus::InProgress);

        assert!(store.delete(saved.id).unwrap());
        assert!(store.get(saved.id).unwrap().is_none());
        assert!(matches!(store.update(&saved), Err(StoreError::Missing { .. })));
    }

    #[test]
    fn test_failed_insert_leaves_no_row() {
        let db = database();
        let store: SqliteStore<StaffTask> = SqliteStore::new(Arc::clone(&db));
        store.insert(task("Kept")).unwrap();

        db.lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER refuse_fill BEFORE UPDATE OF data ON staff_tasks
                 BEGIN SELECT RAISE(ABORT, 'refused'); END;",
            )
            .unwrap();
        assert!(matches!(store.insert(task("Lost")), Err(StoreError::Sqlite(_))));

        db.lock()
            .unwrap()
            .execute_batch("DROP TRIGGER refuse_fill;")
            .unwrap();
        let titles: Vec<String> = store.list().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Kept"]);

        let next = store.insert(task("Next")).unwrap();
        assert_eq!(store.get(next.id).unwrap().unwrap().title, "Next");
    }
}
