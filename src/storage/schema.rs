//! Database schema definitions for GymLog.

/// Name of the gym log table.
pub const GYM_LOG_TABLE: &str = "gymLogTable";

/// Name of the user table.
pub const USER_TABLE: &str = "usertable";

/// SQL schema for creating all database tables.
///
/// `logged_at` holds epoch milliseconds (see `storage::instant`). The
/// `user_id` column references the user table by value only; no foreign-key
/// constraint is declared and username uniqueness is not enforced.
pub const SCHEMA: &str = r#"
-- Gym log table
CREATE TABLE IF NOT EXISTS gymLogTable (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exercise TEXT NOT NULL,
    weight REAL NOT NULL,
    reps INTEGER NOT NULL,
    logged_at INTEGER NOT NULL,
    user_id INTEGER NOT NULL
);

-- User table
CREATE TABLE IF NOT EXISTS usertable (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    password TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0
);
"#;

/// SQL for schema version tracking.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// SQL for the destructive-migration path: drop every entity table so the
/// schema can be recreated from scratch. Prior rows are not preserved.
pub const DROP_TABLES: &str = r#"
DROP TABLE IF EXISTS gymLogTable;
DROP TABLE IF EXISTS usertable;
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 5;
