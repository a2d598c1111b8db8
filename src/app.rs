use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/signup", post(handlers::signup))
        .route("/remove", post(handlers::remove))
        .route("/api/view", get(handlers::get_view))
        .with_state(state)
}
