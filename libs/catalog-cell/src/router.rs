use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers::*;

pub fn specialty_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_specialties))
        .route("/", post(create_specialty))
        .route("/{id}", get(get_specialty))
        .route("/{id}", put(update_specialty))
        .route("/{id}", delete(delete_specialty))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}

pub fn insurance_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_insurance_plans))
        .route("/", post(create_insurance_plan))
        .route("/{id}", get(get_insurance_plan))
        .route("/{id}", put(update_insurance_plan))
        .route("/{id}", delete(delete_insurance_plan))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware))
        .with_state(state)
}
