use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Actions
        .route("/api/actions", get(handlers::actions::list_actions))
        .route("/api/actions/:name", post(handlers::actions::invoke_action))
        .with_state(state)
}
