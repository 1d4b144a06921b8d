// Usage API — the daily generation quota ledger.
// Tracks per-user counters in shared storage with lazy day rollover.

pub mod handlers;
pub mod ledger;
pub mod store;

pub use ledger::{check_quota, increment_quota, QuotaStatus, DAILY_LIMIT};
