use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::auth::LoginResponse;
use shared_models::error::AppError;

use crate::models::{LoginRequest, RegisterRequest};
use crate::services::AccountService;

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AccountService::new(state.db.clone());

    let token = service
        .login(request, &state.config.jwt_secret)
        .await
        .map_err(AppError::from)?;

    Ok(Json(LoginResponse { token }))
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AccountService::new(state.db.clone());

    let account = service.register(request).await.map_err(AppError::from)?;

    Ok((StatusCode::CREATED, Json(json!(account))))
}
