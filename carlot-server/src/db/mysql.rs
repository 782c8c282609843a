//! MySQL-backed store

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{Executor, MySql, MySqlPool};

use super::repos::CarRepo;
use super::session::{CarSession, CarStore, InsertOutcome, SessionSettings, StoreError};
use crate::models::{Car, CarPayload};

/// Store handing out pooled MySQL connections
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl CarStore for MySqlStore {
    async fn acquire(&self) -> Result<Box<dyn CarSession>, StoreError> {
        let conn = self.pool.acquire().await.map_err(StoreError::Acquire)?;
        Ok(Box::new(MySqlSession { conn }))
    }
}

/// A pooled connection; returned to the pool on drop.
pub struct MySqlSession {
    conn: PoolConnection<MySql>,
}

#[async_trait]
impl CarSession for MySqlSession {
    async fn configure(&mut self, settings: &SessionSettings) -> Result<(), StoreError> {
        // SET values are not bindable parameters; settings are pre-validated.
        for statement in settings.statements() {
            (&mut *self.conn).execute(statement.as_str()).await?;
        }
        Ok(())
    }

    async fn list(&mut self) -> Result<Vec<Car>, StoreError> {
        Ok(CarRepo::new(&mut self.conn).list().await?)
    }

    async fn insert(&mut self, car: &CarPayload) -> Result<InsertOutcome, StoreError> {
        Ok(CarRepo::new(&mut self.conn).insert(car).await?)
    }

    async fn update(&mut self, id: i64, car: &CarPayload) -> Result<u64, StoreError> {
        Ok(CarRepo::new(&mut self.conn).update(id, car).await?)
    }

    async fn soft_delete(&mut self, id: i64) -> Result<u64, StoreError> {
        Ok(CarRepo::new(&mut self.conn).soft_delete(id).await?)
    }
}
