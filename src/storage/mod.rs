//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod gym_log_store;
pub mod instant;
pub mod schema;
pub mod types;
pub mod user_store;

pub use config::AppConfig;
pub use database::{Database, DatabaseError};
pub use gym_log_store::GymLogStore;
pub use types::{GymLog, User};
pub use user_store::UserStore;
