//! In-process store for tests
//!
//! Mirrors the MySQL behavior the handlers depend on: auto-increment ids,
//! matched-row counts for updates, no read-time filtering. It also keeps a
//! statement log and a checkout counter so tests can assert that every
//! session was configured and released.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::repos::cars::{INSERT_CAR, LIST_CARS, SOFT_DELETE_CAR, UPDATE_CAR};
use super::session::{CarSession, CarStore, InsertOutcome, SessionSettings, StoreError};
use crate::models::{Car, CarPayload};

/// Where an injected failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// `acquire` times out as if the pool were exhausted
    Acquire,
    /// the session statements are rejected
    Configure,
    /// every car query fails
    Query,
}

#[derive(Default)]
struct Table {
    rows: Vec<Car>,
    last_id: i64,
}

#[derive(Default)]
struct Inner {
    table: Mutex<Table>,
    statements: Mutex<Vec<String>>,
    fail_point: Mutex<Option<FailPoint>>,
    checked_out: AtomicUsize,
    acquired: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared in-memory car table
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent operations fail at `point`; `None` clears it.
    pub fn fail_at(&self, point: Option<FailPoint>) {
        *lock(&self.inner.fail_point) = point;
    }

    /// Sessions currently checked out
    pub fn checked_out(&self) -> usize {
        self.inner.checked_out.load(Ordering::SeqCst)
    }

    /// Sessions handed out since creation
    pub fn acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    /// Every statement executed so far, in order
    pub fn statements(&self) -> Vec<String> {
        lock(&self.inner.statements).clone()
    }

    /// Snapshot of the table
    pub fn rows(&self) -> Vec<Car> {
        lock(&self.inner.table).rows.clone()
    }

    fn failing_at(&self, point: FailPoint) -> bool {
        *lock(&self.inner.fail_point) == Some(point)
    }
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn CarSession>, StoreError> {
        if self.failing_at(FailPoint::Acquire) {
            return Err(StoreError::Acquire(sqlx::Error::PoolTimedOut));
        }

        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        self.inner.checked_out.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            store: self.clone(),
        }))
    }
}

/// Session over [`MemoryStore`]; decrements the checkout count on drop.
pub struct MemorySession {
    store: MemoryStore,
}

impl MemorySession {
    fn record(&self, statement: &str) {
        lock(&self.store.inner.statements).push(statement.to_owned());
    }

    fn run(&self, statement: &str) -> Result<(), StoreError> {
        self.record(statement);
        if self.store.failing_at(FailPoint::Query) {
            return Err(StoreError::Query(sqlx::Error::Protocol(format!(
                "injected failure: {}",
                statement
            ))));
        }
        Ok(())
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.store.inner.checked_out.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CarSession for MemorySession {
    async fn configure(&mut self, settings: &SessionSettings) -> Result<(), StoreError> {
        for statement in settings.statements() {
            self.record(&statement);
            if self.store.failing_at(FailPoint::Configure) {
                return Err(StoreError::Query(sqlx::Error::Protocol(format!(
                    "injected failure: {}",
                    statement
                ))));
            }
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<Car>, StoreError> {
        self.run(LIST_CARS)?;
        Ok(self.store.rows())
    }

    async fn insert(&mut self, car: &CarPayload) -> Result<InsertOutcome, StoreError> {
        self.run(INSERT_CAR)?;

        let mut table = lock(&self.store.inner.table);
        table.last_id += 1;
        let id = table.last_id;
        table.rows.push(Car {
            id,
            make: car.make.clone(),
            model: car.model.clone(),
            year: car.year,
            deleted_flag: 0,
        });

        Ok(InsertOutcome {
            rows_affected: 1,
            last_insert_id: id as u64,
        })
    }

    async fn update(&mut self, id: i64, car: &CarPayload) -> Result<u64, StoreError> {
        self.run(UPDATE_CAR)?;

        let mut table = lock(&self.store.inner.table);
        let mut matched = 0;
        for row in table.rows.iter_mut().filter(|row| row.id == id) {
            row.make = car.make.clone();
            row.model = car.model.clone();
            row.year = car.year;
            matched += 1;
        }
        Ok(matched)
    }

    async fn soft_delete(&mut self, id: i64) -> Result<u64, StoreError> {
        self.run(SOFT_DELETE_CAR)?;

        let mut table = lock(&self.store.inner.table);
        let mut matched = 0;
        for row in table.rows.iter_mut().filter(|row| row.id == id) {
            row.deleted_flag = 1;
            matched += 1;
        }
        Ok(matched)
    }
}
