pub mod catalog;
pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(catalog::handle_get_catalog))
        // Questionnaire sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/start", post(handlers::handle_start))
        .route(
            "/api/v1/sessions/:id/experience",
            post(handlers::handle_submit_experience),
        )
        .route(
            "/api/v1/sessions/:id/evidence/:kind",
            put(handlers::handle_set_evidence),
        )
        .route(
            "/api/v1/sessions/:id/mapping",
            post(handlers::handle_build_mapping),
        )
        .route("/api/v1/sessions/:id/report", get(handlers::handle_get_report))
        .route("/api/v1/sessions/:id/reset", post(handlers::handle_reset))
        .with_state(state)
}
