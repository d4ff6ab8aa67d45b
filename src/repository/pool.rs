//! Fixed-size worker pool for database jobs.
//!
//! All repository operations run on these threads so callers never touch the
//! database directly. Results come back through [`TaskHandle`]; dropping a
//! handle turns the submission into fire-and-forget.

use crate::repository::RepositoryError;
use crate::storage::database::{Database, DatabaseError};
use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

/// Number of threads servicing database jobs.
pub const NUMBER_OF_THREADS: usize = 4;

type Job = Box<dyn FnOnce(&Database) + Send + 'static>;

/// Fixed-size pool of worker threads sharing one database.
pub struct WorkerPool {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spin up the worker threads around the given database.
    pub fn new(db: Database) -> Self {
        let db = Arc::new(Mutex::new(db));
        let (job_tx, job_rx) = unbounded::<Job>();

        let mut workers = Vec::with_capacity(NUMBER_OF_THREADS);
        for _ in 0..NUMBER_OF_THREADS {
            let job_rx = job_rx.clone();
            let db = Arc::clone(&db);
            workers.push(std::thread::spawn(move || worker_loop(job_rx, db)));
        }

        tracing::debug!("worker pool started with {} threads", NUMBER_OF_THREADS);

        Self {
            job_tx: Some(job_tx),
            workers,
        }
    }

    /// Submit a job and return a handle to its eventual result.
    ///
    /// After [`close`](Self::close) the job is discarded and the handle
    /// resolves to [`RepositoryError::Canceled`].
    pub fn submit<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
    {
        let (result_tx, result_rx) = bounded(1);

        let job: Job = Box::new(move |db| {
            // The receiver may already be gone for fire-and-forget callers.
            let _ = result_tx.send(f(db));
        });

        match &self.job_tx {
            Some(tx) => {
                if tx.send(job).is_err() {
                    tracing::warn!("worker pool unavailable, job dropped");
                }
            }
            None => tracing::warn!("worker pool is closed, job dropped"),
        }

        TaskHandle { rx: result_rx }
    }

    /// Drain queued jobs and join the worker threads.
    pub fn close(&mut self) {
        if self.job_tx.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("database worker panicked");
            }
        }
        tracing::debug!("worker pool closed");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(job_rx: Receiver<Job>, db: Arc<Mutex<Database>>) {
    while let Ok(job) = job_rx.recv() {
        job(&lock_database(&db));
    }
}

fn lock_database(db: &Mutex<Database>) -> MutexGuard<'_, Database> {
    match db.lock() {
        Ok(guard) => guard,
        // A panicking job poisons the lock; the database itself is still
        // consistent, each statement being its own transaction.
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Handle to the result of a submitted job.
///
/// The caller decides how to consume it: block with [`wait`](Self::wait),
/// bound the wait with [`wait_timeout`](Self::wait_timeout), poll with
/// [`try_wait`](Self::try_wait), or drop it for fire-and-forget.
pub struct TaskHandle<T> {
    rx: Receiver<Result<T, DatabaseError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the job completes.
    pub fn wait(self) -> Result<T, RepositoryError> {
        match self.rx.recv() {
            Ok(result) => result.map_err(RepositoryError::Database),
            Err(_) => Err(RepositoryError::Canceled),
        }
    }

    /// Block until the job completes or the timeout elapses.
    pub fn wait_timeout(self, timeout: Duration) -> Result<T, RepositoryError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result.map_err(RepositoryError::Database),
            Err(RecvTimeoutError::Timeout) => Err(RepositoryError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(RepositoryError::Canceled),
        }
    }

    /// Check for a result without blocking. `None` while the job is pending.
    pub fn try_wait(&self) -> Option<Result<T, RepositoryError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result.map_err(RepositoryError::Database)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RepositoryError::Canceled)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::user_store::UserStore;

    fn test_pool() -> WorkerPool {
        let db = Database::open_in_memory().expect("Failed to create database");
        WorkerPool::new(db)
    }

    #[test]
    fn test_submit_runs_job_off_thread() {
        let pool = test_pool();
        let caller = std::thread::current().id();

        let handle = pool.submit(move |db| {
            assert_ne!(std::thread::current().id(), caller);
            UserStore::new(db.connection()).count()
        });

        // Two seeded accounts.
        assert_eq!(handle.wait().expect("Failed to run job"), 2);
    }

    #[test]
    fn test_submit_after_close_resolves_canceled() {
        let mut pool = test_pool();
        pool.close();

        let handle = pool.submit(|db| UserStore::new(db.connection()).count());
        assert!(matches!(handle.wait(), Err(RepositoryError::Canceled)));
    }

    #[test]
    fn test_dropped_result_sender_resolves_canceled() {
        let (tx, rx) = bounded::<Result<(), DatabaseError>>(1);
        drop(tx);

        let handle = TaskHandle { rx };
        assert!(matches!(handle.wait(), Err(RepositoryError::Canceled)));
    }

    #[test]
    fn test_wait_timeout_on_slow_job() {
        let pool = test_pool();

        let handle = pool.submit(|_| {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        });

        assert!(matches!(
            handle.wait_timeout(Duration::from_millis(10)),
            Err(RepositoryError::Timeout)
        ));
    }

    #[test]
    fn test_try_wait_pending_then_ready() {
        let pool = test_pool();
        let handle = pool.submit(|db| UserStore::new(db.connection()).count());

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            match handle.try_wait() {
                Some(result) => {
                    assert_eq!(result.expect("Failed to run job"), 2);
                    break;
                }
                None => {
                    assert!(std::time::Instant::now() < deadline, "job never completed");
                    std::thread::yield_now();
                }
            }
        }
    }

    #[test]
    fn test_close_drains_queued_jobs() {
        let mut pool = test_pool();

        let handles: Vec<_> = (0..32)
            .map(|_| pool.submit(|db| UserStore::new(db.connection()).count()))
            .collect();

        pool.close();

        for handle in handles {
            assert_eq!(handle.wait().expect("Job was dropped on close"), 2);
        }
    }
}
