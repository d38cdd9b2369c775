pub mod constraints;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Constraint validation
        .route("/constraints/validate", post(constraints::validate_schedule))
        .route("/constraints/validate-shift", post(constraints::validate_shift))
        .route("/constraints/available-users", get(constraints::available_users))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
