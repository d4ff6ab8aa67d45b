//! GymLog - Workout Set Logging Persistence Layer
//!
//! Persistence-access layer for a workout-set logging application: entity
//! records, a versioned and seeded SQLite store, per-entity data-access
//! stores, and a repository façade that runs every operation on a fixed
//! background worker pool and publishes observed query results through
//! watch channels.

pub mod repository;
pub mod storage;

// Re-export commonly used types
pub use repository::{GymLogRepository, RepositoryError, TaskHandle};
pub use storage::config::AppConfig;
pub use storage::database::{Database, DatabaseError};
pub use storage::types::{GymLog, User};
