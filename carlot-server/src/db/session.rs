//! Store and session abstractions
//!
//! A [`CarStore`] hands out [`CarSession`]s. Each session owns one checked-out
//! connection for the lifetime of a single request and gives it back when the
//! session value is dropped, so release happens on every exit path.

use async_trait::async_trait;

use crate::models::{Car, CarPayload, ValidationError};

/// Session-scoped SQL mode applied to every checked-out connection.
pub const DEFAULT_SQL_MODE: &str = "TRADITIONAL";

/// Session time zone applied to every checked-out connection.
pub const DEFAULT_TIME_ZONE: &str = "-8:00";

const MAX_SETTING_LEN: usize = 64;

/// Database layer error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to acquire connection: {0}")]
    Acquire(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Result of an INSERT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

/// Settings applied to a connection right after checkout.
///
/// Values are interpolated into `SET` statements, so they are restricted to
/// a conservative character set at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    sql_mode: String,
    time_zone: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sql_mode: DEFAULT_SQL_MODE.to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }
}

impl SessionSettings {
    /// Validate and build session settings.
    ///
    /// # Rules
    /// - `sql_mode`: uppercase letters, digits, `_` and `,`
    /// - `time_zone`: an offset like `-8:00` or a named zone like `UTC`
    pub fn new(sql_mode: &str, time_zone: &str) -> Result<Self, ValidationError> {
        check_setting("sql mode", sql_mode, |c| {
            c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_' || c == ','
        })?;
        check_setting("time zone", time_zone, |c| {
            c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | ':' | '/' | '_')
        })?;

        Ok(Self {
            sql_mode: sql_mode.to_owned(),
            time_zone: time_zone.to_owned(),
        })
    }

    pub fn sql_mode(&self) -> &str {
        &self.sql_mode
    }

    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    /// The statements run on each connection, in order.
    pub fn statements(&self) -> [String; 2] {
        [
            format!("SET SESSION sql_mode = '{}'", self.sql_mode),
            format!("SET time_zone = '{}'", self.time_zone),
        ]
    }
}

fn check_setting(
    field: &'static str,
    value: &str,
    allowed: impl Fn(char) -> bool,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.len() > MAX_SETTING_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_SETTING_LEN,
        });
    }
    if !value.chars().all(allowed) {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "contains characters not allowed in a session setting",
        });
    }
    Ok(())
}

/// Source of request-scoped sessions (the connection pool seam)
#[async_trait]
pub trait CarStore: Send + Sync + 'static {
    /// Check out one session. Waits while the pool is exhausted, up to the
    /// pool's own acquire timeout.
    async fn acquire(&self) -> Result<Box<dyn CarSession>, StoreError>;
}

/// One checked-out connection. Dropping it returns the connection.
#[async_trait]
pub trait CarSession: Send {
    /// Run the session statements from `settings` on this connection.
    async fn configure(&mut self, settings: &SessionSettings) -> Result<(), StoreError>;

    /// Every row, soft-deleted ones included, in storage order.
    async fn list(&mut self) -> Result<Vec<Car>, StoreError>;

    async fn insert(&mut self, car: &CarPayload) -> Result<InsertOutcome, StoreError>;

    /// Replace make/model/year of `id`. Returns matched rows.
    async fn update(&mut self, id: i64, car: &CarPayload) -> Result<u64, StoreError>;

    /// Set `deleted_flag = 1` on `id`. Returns matched rows.
    async fn soft_delete(&mut self, id: i64) -> Result<u64, StoreError>;
}
