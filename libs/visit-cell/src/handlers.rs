use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_database::state::AppState;
use shared_models::error::AppError;

use crate::models::{BookVisitRequest, SlotCountQuery, VisitQuery};
use crate::services::visit::VisitService;

/// `POST /patient`: registration when no visit number is supplied, otherwise
/// an appointment append for the returning patient.
#[axum::debug_handler]
pub async fn book_visit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookVisitRequest>,
) -> Result<Json<Value>, AppError> {
    let service = VisitService::new(state.store.clone());

    let visit_no = service.book(request).await?;

    Ok(Json(json!({ "visitNo": visit_no })))
}

#[axum::debug_handler]
pub async fn get_visit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VisitQuery>,
) -> Result<Json<Value>, AppError> {
    let visit_no = query
        .visit_no
        .ok_or_else(|| AppError::BadRequest("Visit number required".to_string()))?;
    let location = query
        .location
        .ok_or_else(|| AppError::BadRequest("Location required".to_string()))?;

    let service = VisitService::new(state.store.clone());

    match service.find_visit(&visit_no, &location).await? {
        Some(record) => Ok(Json(json!(record))),
        None => Err(AppError::NotFound("Patient not found".to_string())),
    }
}

#[axum::debug_handler]
pub async fn slot_count(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotCountQuery>,
) -> Result<Json<Value>, AppError> {
    let (Some(clinic), Some(location), Some(date), Some(time)) =
        (query.clinic, query.location, query.date, query.time)
    else {
        return Err(AppError::BadRequest("Missing parameters".to_string()));
    };

    let service = VisitService::new(state.store.clone());
    let count = service
        .slot_occupancy(&clinic, &location, &date, &time)
        .await?;

    Ok(Json(json!({ "count": count })))
}
