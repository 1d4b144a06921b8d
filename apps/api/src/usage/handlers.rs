//! Axum route handlers for the Usage API.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::state::AppState;
use crate::usage::ledger::{check_quota, QuotaStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCheckQuery {
    pub user_id: Option<String>,
}

/// GET /api/v1/usage-check?userId=...
///
/// Reports where the user stands against today's allowance without charging
/// anything. Clients poll this to decide whether to show the generate button.
pub async fn handle_usage_check(
    State(state): State<AppState>,
    Query(params): Query<UsageCheckQuery>,
) -> Result<Json<QuotaStatus>, AppError> {
    let user_id = params
        .user_id
        .ok_or_else(|| AppError::Validation("Missing userId".to_string()))?;

    let status = check_quota(state.users.as_ref(), &user_id).await?;
    Ok(Json(status))
}
