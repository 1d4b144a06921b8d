use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A saved content draft: one repurposing result the user chose to keep.
///
/// `repurposed_content` is stored as the platform→text object the pipeline
/// returned, untouched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DraftRow {
    pub id: Uuid,
    pub user_id: String,
    pub original_content: String,
    pub repurposed_content: Value,
    pub platforms: Vec<String>,
    pub vibe: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
