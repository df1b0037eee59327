use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::state::AppState;
use shared_models::clinic::{find_clinic, CLINICS};
use shared_models::error::AppError;

use crate::services::closure::ClosureService;
use crate::services::slots::{booking_dates, hourly_slots, BOOKING_DATE_COUNT};

#[derive(Debug, Deserialize)]
pub struct ClinicQuery {
    pub clinic: Option<String>,
}

#[axum::debug_handler]
pub async fn get_closed_days(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let service = ClosureService::new(state.store.clone());

    let closed_days = service
        .list_closures()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "closedDays": closed_days })))
}

#[axum::debug_handler]
pub async fn get_clinics() -> Json<Value> {
    Json(json!({ "clinics": CLINICS }))
}

/// The dates the booking flow may offer for a clinic, closure-aware.
#[axum::debug_handler]
pub async fn get_booking_dates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ClinicQuery>,
) -> Result<Json<Value>, AppError> {
    let name = query
        .clinic
        .ok_or_else(|| AppError::BadRequest("Clinic required".to_string()))?;
    let clinic = find_clinic(&name)
        .ok_or_else(|| AppError::NotFound("Clinic not found".to_string()))?;
    let identity = clinic.identity();

    let service = ClosureService::new(state.store.clone());
    let closures = service
        .closures_for(&identity)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let dates = booking_dates(
        Utc::now().date_naive(),
        &identity,
        &closures,
        BOOKING_DATE_COUNT,
    )
    .map_err(|e| AppError::Internal(e.to_string()))?;

    let dates: Vec<String> = dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    Ok(Json(json!({ "dates": dates })))
}

#[axum::debug_handler]
pub async fn get_slots(Query(query): Query<ClinicQuery>) -> Result<Json<Value>, AppError> {
    let name = query
        .clinic
        .ok_or_else(|| AppError::BadRequest("Clinic required".to_string()))?;
    let clinic = find_clinic(&name)
        .ok_or_else(|| AppError::NotFound("Clinic not found".to_string()))?;

    Ok(Json(json!({ "slots": hourly_slots(clinic.timings) })))
}
