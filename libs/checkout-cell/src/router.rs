use std::sync::Arc;

use axum::{routing::post, Router};

use shared_database::state::AppState;

use crate::handlers::*;

pub fn checkout_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/checkout", post(create_checkout_session))
        .with_state(state)
}
