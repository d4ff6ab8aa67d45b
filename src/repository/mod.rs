//! Repository façade over the storage layer.
//!
//! The single access point a presentation layer would use. Every store
//! operation is submitted to a fixed background worker pool and returns a
//! [`TaskHandle`]; the caller decides whether to wait on it, bound the wait,
//! poll it, or drop it for fire-and-forget. Observed queries return a watch
//! channel that is re-published after every mutation of the underlying table.

pub mod pool;

use crate::storage::config::{self, ConfigError};
use crate::storage::database::{Database, DatabaseError};
use crate::storage::gym_log_store::GymLogStore;
use crate::storage::types::{GymLog, User};
use crate::storage::user_store::UserStore;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;

pub use pool::{TaskHandle, WorkerPool, NUMBER_OF_THREADS};

/// Repository for gym log and user data.
///
/// Constructed explicitly; there is no process-global instance. Each
/// repository owns one database and one worker pool.
pub struct GymLogRepository {
    pool: WorkerPool,
    observers: Arc<ObserverRegistry>,
}

impl GymLogRepository {
    /// Open or create the backing store at the given path.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        Ok(Self::with_database(Database::open(path)?))
    }

    /// Open an in-memory backing store (for testing).
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Ok(Self::with_database(Database::open_in_memory()?))
    }

    /// Open the backing store at the configured default location.
    pub fn open_default() -> Result<Self, RepositoryError> {
        let config = config::load_config()?;
        Self::open(&config.database_path())
    }

    fn with_database(db: Database) -> Self {
        Self {
            pool: WorkerPool::new(db),
            observers: Arc::new(ObserverRegistry::new()),
        }
    }

    /// Drain outstanding work and join the worker threads.
    pub fn close(mut self) {
        self.pool.close();
    }

    // ========== Gym log operations ==========

    /// Insert a new log entry.
    ///
    /// Drop the returned handle for fire-and-forget; the generated row id is
    /// not surfaced.
    pub fn insert_log(&self, log: GymLog) -> TaskHandle<()> {
        self.submit_mutation(Table::GymLogs, move |db| {
            GymLogStore::new(db.connection()).insert(&log)?;
            Ok(())
        })
    }

    /// Retrieve all log entries. Row order is unspecified.
    pub fn get_all_logs(&self) -> TaskHandle<Vec<GymLog>> {
        self.pool
            .submit(|db| GymLogStore::new(db.connection()).get_all())
    }

    /// Retrieve all log entries owned by a user. Row order is unspecified.
    pub fn get_all_logs_by_user(&self, user_id: i64) -> TaskHandle<Vec<GymLog>> {
        self.pool
            .submit(move |db| GymLogStore::new(db.connection()).get_all_by_user_id(user_id))
    }

    /// Observe the log entries owned by a user.
    ///
    /// The receiver starts at an empty snapshot; the first real snapshot is
    /// published from a worker thread, and a fresh one follows every log
    /// mutation.
    pub fn observe_logs_by_user(&self, user_id: i64) -> watch::Receiver<Vec<GymLog>> {
        let (tx, rx) = watch::channel(Vec::new());
        self.register_observer(Table::GymLogs, move |db| {
            publish(&tx, GymLogStore::new(db.connection()).get_all_by_user_id(user_id))
        });
        rx
    }

    // ========== User operations ==========

    /// Insert a new user. Drop the returned handle for fire-and-forget.
    pub fn insert_user(&self, user: User) -> TaskHandle<()> {
        self.submit_mutation(Table::Users, move |db| {
            UserStore::new(db.connection()).insert(&user)?;
            Ok(())
        })
    }

    /// Insert one or more users.
    pub fn insert_users(&self, users: Vec<User>) -> TaskHandle<()> {
        self.submit_mutation(Table::Users, move |db| {
            UserStore::new(db.connection()).insert_many(&users)
        })
    }

    /// Observe the user with the given username, `None` while absent.
    pub fn observe_user_by_username(&self, username: &str) -> watch::Receiver<Option<User>> {
        let username = username.to_string();
        let (tx, rx) = watch::channel(None);
        self.register_observer(Table::Users, move |db| {
            publish(&tx, UserStore::new(db.connection()).get_by_username(&username))
        });
        rx
    }

    /// Observe the user with the given row id, `None` while absent.
    pub fn observe_user_by_id(&self, user_id: i64) -> watch::Receiver<Option<User>> {
        let (tx, rx) = watch::channel(None);
        self.register_observer(Table::Users, move |db| {
            publish(&tx, UserStore::new(db.connection()).get_by_id(user_id))
        });
        rx
    }

    // ========== Internals ==========

    /// Submit a mutation; dependent observers are refreshed inside the same
    /// job, so they are current by the time the handle resolves.
    fn submit_mutation<T, F>(&self, table: Table, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
    {
        let observers = Arc::clone(&self.observers);
        self.pool.submit(move |db| {
            let out = f(db)?;
            observers.refresh(table, db);
            Ok(out)
        })
    }

    /// Register an observed query and schedule its initial snapshot.
    fn register_observer<F>(&self, table: Table, refresh: F)
    where
        F: Fn(&Database) -> bool + Send + 'static,
    {
        self.observers.register(table, Box::new(refresh));

        let observers = Arc::clone(&self.observers);
        drop(self.pool.submit(move |db| {
            observers.refresh(table, db);
            Ok(())
        }));
    }
}

/// Publish a query result to a watch channel.
///
/// Query failures keep the previous snapshot. Returns false once every
/// receiver is gone, which unregisters the observer.
fn publish<T>(tx: &watch::Sender<T>, result: Result<T, DatabaseError>) -> bool {
    if tx.is_closed() {
        return false;
    }
    match result {
        Ok(value) => {
            tx.send_replace(value);
        }
        Err(e) => tracing::warn!("observed query failed: {}", e),
    }
    !tx.is_closed()
}

/// Entity tables observers can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    GymLogs,
    Users,
}

type Refresher = Box<dyn Fn(&Database) -> bool + Send>;

/// Live observed queries, grouped by the table they depend on.
struct ObserverRegistry {
    observers: Mutex<Vec<(Table, Refresher)>>,
}

impl ObserverRegistry {
    fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    fn register(&self, table: Table, refresh: Refresher) {
        self.lock().push((table, refresh));
    }

    /// Re-run every observed query on `table`, dropping closed ones.
    fn refresh(&self, table: Table, db: &Database) {
        self.lock()
            .retain(|(observed, refresh)| *observed != table || refresh(db));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Table, Refresher)>> {
        match self.observers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Repository errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("task canceled before completion")]
    Canceled,

    #[error("task timed out")]
    Timeout,
}
