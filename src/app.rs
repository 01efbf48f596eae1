use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/:kind/plans/:date",
            get(handlers::get_plan).put(handlers::put_plan),
        )
        .route(
            "/api/:kind/plans/:date/entries/:key/complete",
            post(handlers::complete_entry).delete(handlers::uncomplete_entry),
        )
        .with_state(state)
}
