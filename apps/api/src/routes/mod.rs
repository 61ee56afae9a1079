pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assessment API
        .route(
            "/api/v1/assessment/questions",
            post(handlers::handle_generate_questions),
        )
        .route(
            "/api/v1/assessment/online-questions",
            post(handlers::handle_online_questions),
        )
        .route("/api/v1/assessment/evaluate", post(handlers::handle_evaluate))
        .route("/api/v1/assessment/assess", post(handlers::handle_assess))
        .route("/api/v1/assessment/follow-up", post(handlers::handle_follow_up))
        .route("/api/v1/assessment/analyze", post(handlers::handle_analyze))
        .route(
            "/api/v1/assessment/overall-feedback",
            post(handlers::handle_overall_feedback),
        )
        .route(
            "/api/v1/assessment/suggestions",
            post(handlers::handle_suggestions),
        )
        .with_state(state)
}
