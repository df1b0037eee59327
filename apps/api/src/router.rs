use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use availability_cell::router::availability_routes;
use checkout_cell::router::checkout_routes;
use shared_database::state::AppState;
use visit_cell::router::visit_routes;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Narwal Clinic API is running!" }))
        .merge(availability_routes(state.clone()))
        .nest("/patient", visit_routes(state.clone()))
        .nest("/payment", checkout_routes(state))
}
