use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/entries", get(handlers::list_entries).post(handlers::create_entry))
        .route("/api/entries/:id", delete(handlers::delete_entry))
        .route("/api/entries/:id/activities", post(handlers::tag_entry_activity))
        .route("/api/insights", get(handlers::get_insights))
        .route("/api/goals", get(handlers::list_goals).post(handlers::create_goal))
        .route("/api/goals/:id", delete(handlers::delete_goal))
        .route("/api/goals/:id/progress", post(handlers::increment_goal))
        .route("/api/goals/:id/complete", post(handlers::complete_goal))
        .route("/api/streak", get(handlers::get_streak))
        .route("/api/streak/check", post(handlers::check_streak))
        .route("/api/achievements", get(handlers::list_achievements))
        .route("/api/achievements/evaluate", post(handlers::evaluate_achievements))
        .route("/api/export", get(handlers::export_data))
        .route("/api/import", post(handlers::import_data))
        .with_state(state)
}
