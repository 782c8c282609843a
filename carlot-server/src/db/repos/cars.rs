//! Car repository
//!
//! One statement per operation, executed on a single borrowed connection:
//! - list: unfiltered SELECT (soft-deleted rows included)
//! - update/soft_delete: report matched rows so callers can detect a miss

use sqlx::MySqlConnection;

use crate::db::session::InsertOutcome;
use crate::models::{Car, CarPayload};

pub const LIST_CARS: &str = "SELECT * FROM car";
pub const INSERT_CAR: &str = "INSERT INTO car (make, model, year) VALUES (?, ?, ?)";
pub const UPDATE_CAR: &str = "UPDATE car SET make = ?, model = ?, year = ? WHERE id = ?";
pub const SOFT_DELETE_CAR: &str = "UPDATE car SET deleted_flag = 1 WHERE id = ?";

/// Car repository bound to one connection
pub struct CarRepo<'a> {
    conn: &'a mut MySqlConnection,
}

impl<'a> CarRepo<'a> {
    pub fn new(conn: &'a mut MySqlConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&mut self) -> Result<Vec<Car>, sqlx::Error> {
        sqlx::query_as::<_, Car>(LIST_CARS)
            .fetch_all(&mut *self.conn)
            .await
    }

    pub async fn insert(&mut self, car: &CarPayload) -> Result<InsertOutcome, sqlx::Error> {
        let result = sqlx::query(INSERT_CAR)
            .bind(car.make.as_deref())
            .bind(car.model.as_deref())
            .bind(car.year)
            .execute(&mut *self.conn)
            .await?;

        Ok(InsertOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_id(),
        })
    }

    /// Full replace: absent payload fields are written as NULL.
    pub async fn update(&mut self, id: i64, car: &CarPayload) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(UPDATE_CAR)
            .bind(car.make.as_deref())
            .bind(car.model.as_deref())
            .bind(car.year)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn soft_delete(&mut self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(SOFT_DELETE_CAR)
            .bind(id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }
}
