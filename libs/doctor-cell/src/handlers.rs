use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::pagination::Paginated;

use crate::models::{CreateDoctorRequest, Doctor, DoctorSearchQuery, UpdateDoctorRequest};
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Paginated<Doctor>>, AppError> {
    let service = DoctorService::new(state.db.clone());

    let page = service.search_doctors(query).await.map_err(AppError::from)?;

    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(state.db.clone());

    let doctor = service.get_doctor(doctor_id).await.map_err(AppError::from)?;

    Ok(Json(json!(doctor)))
}

/// Today's agenda and everything after it, anchored to the clinic's civil
/// timezone rather than UTC.
#[axum::debug_handler]
pub async fn doctor_appointments(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(state.db.clone());

    let today_start = Utc::now()
        .with_timezone(&state.config.clinic_timezone)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Internal("Invalid day boundary".to_string()))?;

    let appointments = service
        .upcoming_appointments(doctor_id, today_start)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Doctor create requested by user {}", user.id);
    let service = DoctorService::new(state.db.clone());

    let doctor = service.create_doctor(request).await.map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<i64>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Doctor {} update requested by user {}", doctor_id, user.id);
    let service = DoctorService::new(state.db.clone());

    let doctor = service
        .update_doctor(doctor_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(doctor_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Doctor {} delete requested by user {}", doctor_id, user.id);
    let service = DoctorService::new(state.db.clone());

    service.delete_doctor(doctor_id).await.map_err(AppError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
