pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;

use std::sync::Arc;

use engine::ConstraintEngine;
use store::ScheduleStore;

/// Shared application state available to all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    pub engine: ConstraintEngine,
    pub max_range_days: i64,
}
