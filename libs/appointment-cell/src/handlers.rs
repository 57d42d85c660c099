use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::pagination::Paginated;

use crate::models::{
    AppointmentListItem, AppointmentSearchQuery, CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::BookingService;

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Paginated<AppointmentListItem>>, AppError> {
    let service = BookingService::new(state.db.clone());

    let page = service.search_appointments(query).await.map_err(AppError::from)?;

    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(state.db.clone());

    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Appointment create requested by user {}", user.id);
    let service = BookingService::new(state.db.clone());

    let appointment = service
        .create_appointment(request)
        .await
        .map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!(
        "Appointment {} update requested by user {}",
        appointment_id, user.id
    );
    let service = BookingService::new(state.db.clone());

    let appointment = service
        .update_appointment(appointment_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(appointment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!(
        "Appointment {} delete requested by user {}",
        appointment_id, user.id
    );
    let service = BookingService::new(state.db.clone());

    service
        .delete_appointment(appointment_id)
        .await
        .map_err(AppError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
