//! Data-access operations for gym log entries.

use crate::storage::database::DatabaseError;
use crate::storage::instant;
use crate::storage::types::GymLog;
use rusqlite::{params, Connection, Row};

/// Store for reading and writing gym log rows over a borrowed connection.
pub struct GymLogStore<'a> {
    conn: &'a Connection,
}

impl<'a> GymLogStore<'a> {
    /// Create a new gym log store with the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a log entry and return its generated row id.
    pub fn insert(&self, log: &GymLog) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO gymLogTable (exercise, weight, reps, logged_at, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    log.exercise,
                    log.weight,
                    log.reps,
                    instant::to_epoch_millis(&log.logged_at),
                    log.user_id,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get all log entries. Row order is unspecified.
    pub fn get_all(&self) -> Result<Vec<GymLog>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, exercise, weight, reps, logged_at, user_id FROM gymLogTable")
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], map_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(logs)
    }

    /// Get all log entries owned by a user. Row order is unspecified.
    pub fn get_all_by_user_id(&self, user_id: i64) -> Result<Vec<GymLog>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, exercise, weight, reps, logged_at, user_id FROM gymLogTable
                 WHERE user_id = ?1",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], map_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(logs)
    }

    /// Count log entries in the database.
    pub fn count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM gymLogTable", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

fn map_row(row: &Row) -> rusqlite::Result<GymLog> {
    let millis: i64 = row.get(4)?;
    let logged_at = instant::from_epoch_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })?;

    Ok(GymLog {
        id: row.get(0)?,
        exercise: row.get(1)?,
        weight: row.get(2)?,
        reps: row.get(3)?,
        logged_at,
        user_id: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    #[test]
    fn test_insert_and_get_all() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let store = GymLogStore::new(db.connection());

        let log = GymLog::new("Bench Press".to_string(), 135.0, 5, 2);
        let id = store.insert(&log).expect("Failed to insert log");
        assert!(id > 0);

        let logs = store.get_all().expect("Failed to get logs");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, id);
        assert_eq!(logs[0].exercise, "Bench Press");
        assert_eq!(logs[0].weight, 135.0);
        assert_eq!(logs[0].reps, 5);
        assert_eq!(logs[0].user_id, 2);
    }

    #[test]
    fn test_timestamp_round_trips_through_storage() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let store = GymLogStore::new(db.connection());

        let log = GymLog::new("Row".to_string(), 95.0, 8, 1);
        store.insert(&log).expect("Failed to insert log");

        let logs = store.get_all().expect("Failed to get logs");
        assert_eq!(
            logs[0].logged_at.timestamp_millis(),
            log.logged_at.timestamp_millis()
        );
    }

    #[test]
    fn test_get_all_by_user_id_filters_owner() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let store = GymLogStore::new(db.connection());

        store
            .insert(&GymLog::new("Squat".to_string(), 225.0, 5, 1))
            .expect("Failed to insert log");
        store
            .insert(&GymLog::new("Bench Press".to_string(), 135.0, 5, 2))
            .expect("Failed to insert log");
        store
            .insert(&GymLog::new("Deadlift".to_string(), 315.0, 3, 2))
            .expect("Failed to insert log");

        let logs = store.get_all_by_user_id(2).expect("Failed to get logs");
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|log| log.user_id == 2));

        let logs = store.get_all_by_user_id(99).expect("Failed to get logs");
        assert!(logs.is_empty());
    }

    #[test]
    fn test_unvalidated_values_are_accepted() {
        let db = Database::open_in_memory().expect("Failed to create database");
        let store = GymLogStore::new(db.connection());

        // No bounds checks on weight or reps, no non-empty check on names.
        store
            .insert(&GymLog::new(String::new(), -10.0, 0, -1))
            .expect("Failed to insert log");

        let logs = store.get_all_by_user_id(-1).expect("Failed to get logs");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].weight, -10.0);
    }
}
