//! Axum route handlers for the Drafts API.
//!
//! Drafts are the client's choice to keep a generation result. The pipeline
//! never writes here, and a failed save never refunds a quota charge.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::platform::Platform;
use crate::generation::vibe::Vibe;
use crate::models::draft::DraftRow;
use crate::state::AppState;

/// A draft is either still editable or published. No other states.
fn is_valid_status(status: &str) -> bool {
    matches!(status, "draft" | "published")
}

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    pub user_id: String,
    pub original_content: String,
    /// The platform→text object as returned by the repurpose endpoint.
    pub repurposed_content: Value,
    pub platforms: Vec<Platform>,
    pub vibe: Vibe,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "draft".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDraftStatusRequest {
    pub user_id: String,
    pub status: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/drafts
///
/// Saves a generation result the user wants to keep.
pub async fn handle_create_draft(
    State(state): State<AppState>,
    Json(request): Json<CreateDraftRequest>,
) -> Result<Json<DraftRow>, AppError> {
    if request.original_content.trim().is_empty() {
        return Err(AppError::Validation(
            "originalContent cannot be empty".to_string(),
        ));
    }
    if !is_valid_status(&request.status) {
        return Err(AppError::Validation(format!(
            "Unknown draft status '{}'",
            request.status
        )));
    }

    let platforms: Vec<String> = request
        .platforms
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();

    let draft = sqlx::query_as::<_, DraftRow>(
        r#"
        INSERT INTO drafts
            (id, user_id, original_content, repurposed_content, platforms, vibe, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&request.user_id)
    .bind(&request.original_content)
    .bind(&request.repurposed_content)
    .bind(&platforms)
    .bind(request.vibe.as_str())
    .bind(&request.status)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(draft))
}

/// GET /api/v1/drafts?userId=...
///
/// Lists the user's drafts, newest first.
pub async fn handle_list_drafts(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<DraftRow>>, AppError> {
    let drafts = sqlx::query_as::<_, DraftRow>(
        "SELECT * FROM drafts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(&params.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(drafts))
}

/// PATCH /api/v1/drafts/:id
///
/// Moves a draft between the "draft" and "published" states. Publishing is
/// just this transition; nothing is posted anywhere.
pub async fn handle_update_draft_status(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    Json(request): Json<UpdateDraftStatusRequest>,
) -> Result<Json<DraftRow>, AppError> {
    if !is_valid_status(&request.status) {
        return Err(AppError::Validation(format!(
            "Unknown draft status '{}'",
            request.status
        )));
    }

    let draft = sqlx::query_as::<_, DraftRow>(
        r#"
        UPDATE drafts
        SET status = $1, updated_at = now()
        WHERE id = $2 AND user_id = $3
        RETURNING *
        "#,
    )
    .bind(&request.status)
    .bind(draft_id)
    .bind(&request.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Draft {draft_id} not found")))?;

    Ok(Json(draft))
}

/// DELETE /api/v1/drafts/:id?userId=...
pub async fn handle_delete_draft(
    State(state): State<AppState>,
    Path(draft_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM drafts WHERE id = $1 AND user_id = $2")
        .bind(draft_id)
        .bind(&params.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Draft {draft_id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
