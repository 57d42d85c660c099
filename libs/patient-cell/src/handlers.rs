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

use crate::models::{CreatePatientRequest, Patient, PatientSearchQuery, UpdatePatientRequest};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Paginated<Patient>>, AppError> {
    let service = PatientService::new(state.db.clone());

    let page = service.search_patients(query).await.map_err(AppError::from)?;

    Ok(Json(page))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(state.db.clone());

    let patient = service.get_patient(patient_id).await.map_err(AppError::from)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Patient create requested by user {}", user.id);
    let service = PatientService::new(state.db.clone());

    let patient = service.create_patient(request).await.map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Patient {} update requested by user {}", patient_id, user.id);
    let service = PatientService::new(state.db.clone());

    let patient = service
        .update_patient(patient_id, request)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(patient_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Patient {} delete requested by user {}", patient_id, user.id);
    let service = PatientService::new(state.db.clone());

    service.delete_patient(patient_id).await.map_err(AppError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
