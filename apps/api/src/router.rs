use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use catalog_cell::router::{insurance_routes, specialty_routes};
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/api", auth_routes(state.clone()))
        .nest("/api/pacientes", patient_routes(state.clone()))
        .nest("/api/medicos", doctor_routes(state.clone()))
        .nest("/api/especialidades", specialty_routes(state.clone()))
        .nest("/api/convenios", insurance_routes(state.clone()))
        .nest("/api/agendamentos", appointment_routes(state))
}
