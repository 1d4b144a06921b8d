use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::LlmClient;
use crate::usage::store::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Quota reads and writes go through this seam. Production wires in
    /// `PgUserStore`; tests substitute an in-memory store.
    pub users: Arc<dyn UserStore>,
}
