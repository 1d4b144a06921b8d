pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::drafts::handlers as drafts;
use crate::generation::handlers as generation;
use crate::state::AppState;
use crate::usage::handlers as usage;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Generation API
        .route("/api/v1/repurpose", post(generation::handle_repurpose))
        .route("/api/v1/vibe-change", post(generation::handle_vibe_change))
        // Usage API
        .route("/api/v1/usage-check", get(usage::handle_usage_check))
        // Drafts API
        .route(
            "/api/v1/drafts",
            post(drafts::handle_create_draft).get(drafts::handle_list_drafts),
        )
        .route(
            "/api/v1/drafts/:id",
            patch(drafts::handle_update_draft_status).delete(drafts::handle_delete_draft),
        )
        .with_state(state)
}
