//! The daily generation quota ledger.
//!
//! Counters reset lazily: nothing runs at midnight. A record whose date is
//! not today's UTC date simply reads as zero, and the next charge overwrites
//! it with today's date. Check and charge are separate store round trips
//! with no locking, so two concurrent requests can both pass the check and
//! one increment can overwrite the other. The counter is advisory, not a
//! hard billing ledger.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::usage::store::UserStore;

/// Generations allowed per user per UTC calendar day.
pub const DAILY_LIMIT: i32 = 5;

/// Applies the lazy reset rule: a stored count only counts if it was written
/// today. Nothing is written back here; the reset lands on the next charge.
pub fn effective_used(stored_used: i32, stored_date: Option<NaiveDate>, today: NaiveDate) -> i32 {
    match stored_date {
        Some(date) if date == today => stored_used,
        _ => 0,
    }
}

/// Snapshot of a user's quota. Doubles as the usage-check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub can_generate: bool,
    pub remaining: i32,
    pub used: i32,
    pub limit: i32,
}

/// Reads a user's current standing. A user with no record, or a record from
/// a previous day, has used none of today's allowance.
pub async fn check_quota(store: &dyn UserStore, user_id: &str) -> Result<QuotaStatus, AppError> {
    let record = store.quota(user_id).await?;
    let today = Utc::now().date_naive();

    let used = record
        .map(|r| effective_used(r.generations_used_today, r.last_generation_date, today))
        .unwrap_or(0);

    Ok(QuotaStatus {
        can_generate: used < DAILY_LIMIT,
        remaining: (DAILY_LIMIT - used).max(0),
        used,
        limit: DAILY_LIMIT,
    })
}

/// Charges one generation and returns the remaining allowance.
///
/// Re-reads the record, applies the lazy reset, then writes `used + 1` under
/// today's date. Callers invoke this only after a usable generation; nothing
/// that fails afterwards refunds the charge.
pub async fn increment_quota(store: &dyn UserStore, user_id: &str) -> Result<i32, AppError> {
    let record = store.quota(user_id).await?;
    let today = Utc::now().date_naive();

    let used = record
        .map(|r| effective_used(r.generations_used_today, r.last_generation_date, today))
        .unwrap_or(0);

    let new_used = used + 1;
    store.write_quota(user_id, new_used, today).await?;

    Ok((DAILY_LIMIT - new_used).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::store::testing::MemoryUserStore;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_effective_used_keeps_todays_count() {
        let today = day(2025, 6, 1);
        assert_eq!(effective_used(3, Some(today), today), 3);
    }

    #[test]
    fn test_effective_used_resets_stale_dates() {
        assert_eq!(effective_used(5, Some(day(2025, 5, 31)), day(2025, 6, 1)), 0);
    }

    #[test]
    fn test_effective_used_treats_missing_date_as_zero() {
        assert_eq!(effective_used(4, None, day(2025, 6, 1)), 0);
    }

    #[test]
    fn test_quota_status_serializes_wire_names() {
        let status = QuotaStatus {
            can_generate: true,
            remaining: 2,
            used: 3,
            limit: 5,
        };

        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["canGenerate"], serde_json::json!(true));
        assert_eq!(value["remaining"], serde_json::json!(2));
        assert_eq!(value["used"], serde_json::json!(3));
        assert_eq!(value["limit"], serde_json::json!(5));
    }

    #[tokio::test]
    async fn test_unknown_user_has_full_allowance() {
        let store = MemoryUserStore::default();

        let status = check_quota(&store, "user-1").await.unwrap();

        assert!(status.can_generate);
        assert_eq!(status.used, 0);
        assert_eq!(status.remaining, DAILY_LIMIT);
        assert_eq!(status.limit, DAILY_LIMIT);
    }

    #[tokio::test]
    async fn test_increments_accumulate_within_a_day() {
        let store = MemoryUserStore::default();

        for expected_remaining in (0..DAILY_LIMIT).rev() {
            let remaining = increment_quota(&store, "user-1").await.unwrap();
            assert_eq!(remaining, expected_remaining);
        }

        let status = check_quota(&store, "user-1").await.unwrap();
        assert!(!status.can_generate);
        assert_eq!(status.used, DAILY_LIMIT);
        assert_eq!(status.remaining, 0);
    }

    #[tokio::test]
    async fn test_check_ignores_counts_from_previous_days() {
        let store = MemoryUserStore::with_record("user-1", 5, day(2024, 1, 1));

        let status = check_quota(&store, "user-1").await.unwrap();

        assert!(status.can_generate);
        assert_eq!(status.used, 0);
        assert_eq!(status.remaining, DAILY_LIMIT);
    }

    #[tokio::test]
    async fn test_charge_after_stale_date_starts_from_one() {
        let store = MemoryUserStore::with_record("user-1", 5, day(2024, 1, 1));

        let remaining = increment_quota(&store, "user-1").await.unwrap();

        assert_eq!(remaining, DAILY_LIMIT - 1);
        let record = store.record("user-1").unwrap();
        assert_eq!(record.generations_used_today, 1);
        assert_eq!(record.last_generation_date, Some(Utc::now().date_naive()));
    }

    #[tokio::test]
    async fn test_remaining_never_goes_negative() {
        let today = Utc::now().date_naive();
        let store = MemoryUserStore::with_record("user-1", DAILY_LIMIT + 2, today);

        let status = check_quota(&store, "user-1").await.unwrap();
        assert_eq!(status.remaining, 0);
        assert!(!status.can_generate);

        let remaining = increment_quota(&store, "user-1").await.unwrap();
        assert_eq!(remaining, 0);
    }
}
