//! User quota records and the store seam the ledger runs over.
//!
//! Quota state lives in shared Postgres, never in process memory: every API
//! instance serving a user must observe the same counter.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;

/// A user's daily generation counter plus the day it was last written.
///
/// The count only means something relative to the date: a stale date reads
/// as zero used, regardless of the stored number.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct QuotaRecord {
    pub generations_used_today: i32,
    pub last_generation_date: Option<NaiveDate>,
}

/// Read/write access to quota records.
///
/// `PgUserStore` is the production implementation; tests use the in-memory
/// fake below. Reads and writes are individual round trips with no
/// transaction between them, so the ledger's check-then-write sequences are
/// not atomic.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fetches a user's quota record. `None` means the user has never
    /// generated anything, which counts as zero used rather than an error.
    async fn quota(&self, user_id: &str) -> Result<Option<QuotaRecord>, AppError>;

    /// Writes the counter and its date, creating the record on first use.
    async fn write_quota(&self, user_id: &str, used: i32, date: NaiveDate) -> Result<(), AppError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn quota(&self, user_id: &str) -> Result<Option<QuotaRecord>, AppError> {
        let record = sqlx::query_as::<_, QuotaRecord>(
            "SELECT generations_used_today, last_generation_date FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn write_quota(&self, user_id: &str, used: i32, date: NaiveDate) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, generations_used_today, last_generation_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET generations_used_today = EXCLUDED.generations_used_today,
                last_generation_date = EXCLUDED.last_generation_date
            "#,
        )
        .bind(user_id)
        .bind(used)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store for unit tests. Not a production option: quota state
    /// must be shared across instances, not trapped in one process.
    #[derive(Default)]
    pub struct MemoryUserStore {
        records: Mutex<HashMap<String, QuotaRecord>>,
    }

    impl MemoryUserStore {
        pub fn with_record(user_id: &str, used: i32, date: NaiveDate) -> Self {
            let store = Self::default();
            store.records.lock().unwrap().insert(
                user_id.to_string(),
                QuotaRecord {
                    generations_used_today: used,
                    last_generation_date: Some(date),
                },
            );
            store
        }

        pub fn record(&self, user_id: &str) -> Option<QuotaRecord> {
            self.records.lock().unwrap().get(user_id).copied()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn quota(&self, user_id: &str) -> Result<Option<QuotaRecord>, AppError> {
            Ok(self.record(user_id))
        }

        async fn write_quota(
            &self,
            user_id: &str,
            used: i32,
            date: NaiveDate,
        ) -> Result<(), AppError> {
            self.records.lock().unwrap().insert(
                user_id.to_string(),
                QuotaRecord {
                    generations_used_today: used,
                    last_generation_date: Some(date),
                },
            );
            Ok(())
        }
    }
}
