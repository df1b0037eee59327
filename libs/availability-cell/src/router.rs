use std::sync::Arc;

use axum::{routing::get, Router};

use shared_database::state::AppState;

use crate::handlers::*;

pub fn availability_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/closed-days", get(get_closed_days))
        .route("/clinics", get(get_clinics))
        .route("/availability/dates", get(get_booking_dates))
        .route("/availability/slots", get(get_slots))
        .with_state(state)
}
