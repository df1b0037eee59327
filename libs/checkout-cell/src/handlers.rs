use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use shared_database::state::AppState;
use shared_models::error::AppError;

use crate::models::CheckoutRequest;
use crate::services::checkout::CheckoutService;

#[axum::debug_handler]
pub async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    if !state.config.is_checkout_configured() {
        return Err(AppError::ExternalService(
            "Stripe secret key is not configured".to_string(),
        ));
    }

    let service = CheckoutService::new(&state.config);

    let url = service
        .create_session(&request.success_url, &request.cancel_url)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "url": url })))
}
