use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;

use crate::models::{InsurancePlanRequest, SpecialtyRequest};
use crate::services::{InsurancePlanService, SpecialtyService};

// ---- Specialties ----

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(state.db.clone());
    let specialties = service.list().await.map_err(AppError::from)?;
    Ok(Json(json!(specialties)))
}

#[axum::debug_handler]
pub async fn get_specialty(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(state.db.clone());
    let specialty = service.get(id).await.map_err(AppError::from)?;
    Ok(Json(json!(specialty)))
}

#[axum::debug_handler]
pub async fn create_specialty(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Specialty create requested by user {}", user.id);
    let service = SpecialtyService::new(state.db.clone());
    let specialty = service.create(request).await.map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(json!(specialty))))
}

#[axum::debug_handler]
pub async fn update_specialty(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = SpecialtyService::new(state.db.clone());
    let specialty = service.update(id, request).await.map_err(AppError::from)?;
    Ok(Json(json!(specialty)))
}

#[axum::debug_handler]
pub async fn delete_specialty(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let service = SpecialtyService::new(state.db.clone());
    service.delete(id).await.map_err(AppError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Insurance plans ----

#[axum::debug_handler]
pub async fn list_insurance_plans(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = InsurancePlanService::new(state.db.clone());
    let plans = service.list().await.map_err(AppError::from)?;
    Ok(Json(json!(plans)))
}

#[axum::debug_handler]
pub async fn get_insurance_plan(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let service = InsurancePlanService::new(state.db.clone());
    let plan = service.get(id).await.map_err(AppError::from)?;
    Ok(Json(json!(plan)))
}

#[axum::debug_handler]
pub async fn create_insurance_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<InsurancePlanRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Insurance plan create requested by user {}", user.id);
    let service = InsurancePlanService::new(state.db.clone());
    let plan = service.create(request).await.map_err(AppError::from)?;
    Ok((StatusCode::CREATED, Json(json!(plan))))
}

#[axum::debug_handler]
pub async fn update_insurance_plan(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(request): Json<InsurancePlanRequest>,
) -> Result<Json<Value>, AppError> {
    let service = InsurancePlanService::new(state.db.clone());
    let plan = service.update(id, request).await.map_err(AppError::from)?;
    Ok(Json(json!(plan)))
}

#[axum::debug_handler]
pub async fn delete_insurance_plan(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let service = InsurancePlanService::new(state.db.clone());
    service.delete(id).await.map_err(AppError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
