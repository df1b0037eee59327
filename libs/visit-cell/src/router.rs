use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_database::state::AppState;

use crate::handlers::*;

pub fn visit_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(book_visit).get(get_visit))
        .route("/slot-count", get(slot_count))
        .with_state(state)
}
