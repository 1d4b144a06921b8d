//! Axum route handlers for the Generation API.
//!
//! Handlers stay thin: validation and quota policy live in the pipeline
//! functions so they can be tested against in-memory stores and scripted
//! gateways.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::generation::generator::{
    change_vibe, repurpose, RepurposeRequest, RepurposeResponse, VibeChangeRequest,
    VibeChangeResponse,
};
use crate::state::AppState;

/// POST /api/v1/repurpose
///
/// Rewrites one piece of content into per-platform posts in the requested
/// vibe. Costs one generation from the user's daily allowance.
pub async fn handle_repurpose(
    State(state): State<AppState>,
    Json(request): Json<RepurposeRequest>,
) -> Result<Json<RepurposeResponse>, AppError> {
    let response = repurpose(state.users.as_ref(), &state.llm, request).await?;
    Ok(Json(response))
}

/// POST /api/v1/vibe-change
///
/// Rewrites a text in the requested vibe, keeping the message intact.
/// Costs one generation from the user's daily allowance.
pub async fn handle_vibe_change(
    State(state): State<AppState>,
    Json(request): Json<VibeChangeRequest>,
) -> Result<Json<VibeChangeResponse>, AppError> {
    let response = change_vibe(state.users.as_ref(), &state.llm, request).await?;
    Ok(Json(response))
}
