//! Database container using rusqlite.
//!
//! Owns the single SQLite connection, declares the schema version, applies
//! the destructive-migration policy, and seeds the default user accounts the
//! first time the store is physically created.

use crate::storage::schema::{CURRENT_VERSION, DROP_TABLES, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::storage::types::User;
use crate::storage::user_store::UserStore;
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use thiserror::Error;

/// Database wrapper for SQLite operations.
///
/// Construction is explicit; there is no process-global instance. Tests
/// inject a fresh store via [`Database::open_in_memory`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    ///
    /// A physically fresh store is created at the current version and seeded
    /// with the default accounts. Any recorded version other than the current
    /// one triggers destructive recreation: all entity tables are dropped,
    /// recreated, and reseeded. A matching version leaves the store untouched,
    /// so seeding runs at most once per store lifetime.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let version = self.get_schema_version()?;

        if version == 0 {
            self.create_schema()?;
            self.seed_default_users()?;
            tracing::info!("database created at schema version {}", CURRENT_VERSION);
        } else if version != CURRENT_VERSION {
            tracing::warn!(
                "schema version mismatch ({} on disk, {} expected), recreating all tables",
                version,
                CURRENT_VERSION
            );
            self.conn
                .execute_batch(DROP_TABLES)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.conn
                .execute("DELETE FROM schema_version", [])
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
            self.create_schema()?;
            self.seed_default_users()?;
        }

        Ok(())
    }

    /// Create the entity tables and record the current schema version.
    fn create_schema(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
                [CURRENT_VERSION],
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    /// Get the recorded schema version, or 0 for a fresh store.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Seed the default user accounts.
    ///
    /// Clears the user table first, so the effect is the same however often
    /// it runs; `initialize` only invokes it on creation or recreation.
    fn seed_default_users(&self) -> Result<(), DatabaseError> {
        let users = UserStore::new(&self.conn);
        users.delete_all()?;

        let mut admin = User::new("admin1".to_string(), "admin1".to_string());
        admin.is_admin = true;
        users.insert(&admin)?;

        let test_user = User::new("testuser1".to_string(), "testuser1".to_string());
        users.insert(&test_user)?;

        tracing::info!("seeded default user accounts");
        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}
