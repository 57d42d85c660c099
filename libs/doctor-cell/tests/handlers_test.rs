use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers;
use doctor_cell::models::{CreateDoctorRequest, DoctorSearchQuery};
use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::test_utils::{TestConfig, TestUser};

fn test_state(server: &MockServer) -> Arc<AppState> {
    let config = TestConfig::with_database_url(&server.uri()).to_app_config();
    Arc::new(AppState::new(config))
}

fn admin() -> Extension<AuthUser> {
    Extension(TestUser::admin().to_user())
}

fn create_request() -> CreateDoctorRequest {
    CreateDoctorRequest {
        name: Some("Dra. Helena Prado".to_string()),
        specialty_id: Some(3),
        email: Some("helena@clinic.example".to_string()),
        phone: Some("11 98888-0000".to_string()),
        license_number: Some("123456".to_string()),
        license_state: Some("sp".to_string()),
        photo_url: None,
        bio: None,
        active: None,
    }
}

#[tokio::test]
async fn list_doctors_filters_by_specialty() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("especialidade_id", "eq.3"))
        .and(query_param("order", "nome.asc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/1")
                .set_body_json(json!([{
                    "id": 9,
                    "nome": "Dra. Helena Prado",
                    "especialidade_id": 3,
                    "especialidade": { "id": 3, "nome": "Cardiologia" },
                    "email": "helena@clinic.example",
                    "crm_numero": "123456",
                    "crm_uf": "SP",
                    "ativo": true
                }])),
        )
        .mount(&server)
        .await;

    let Json(page) = handlers::list_doctors(
        State(state),
        admin(),
        Query(DoctorSearchQuery {
            search: None,
            specialty_id: Some(3),
            page: None,
            limit: None,
        }),
    )
    .await
    .expect("list should succeed");

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.pagination.total_items, 1);
    let specialty = page.data[0].specialty.as_ref().expect("embedded specialty");
    assert_eq!(specialty.name, "Cardiologia");
}

#[tokio::test]
async fn create_doctor_uppercases_license_state() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("POST"))
        .and(path("/rest/v1/medicos"))
        .and(wiremock::matchers::body_partial_json(json!({ "crm_uf": "SP" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 9,
            "nome": "Dra. Helena Prado",
            "especialidade_id": 3,
            "email": "helena@clinic.example",
            "crm_numero": "123456",
            "crm_uf": "SP",
            "ativo": true
        }])))
        .mount(&server)
        .await;

    let (status, Json(body)) = handlers::create_doctor(State(state), admin(), Json(create_request()))
        .await
        .expect("create should succeed");

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["crm_uf"], "SP");
}

#[tokio::test]
async fn create_doctor_requires_license_number() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    let mut request = create_request();
    request.license_number = None;

    let err = handlers::create_doctor(State(state), admin(), Json(request))
        .await
        .unwrap_err();

    assert_matches!(err, AppError::ValidationError(_));
}

#[tokio::test]
async fn create_doctor_maps_unique_violation_to_conflict() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("POST"))
        .and(path("/rest/v1/medicos"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"medicos_crm_key\""
        })))
        .mount(&server)
        .await;

    let err = handlers::create_doctor(State(state), admin(), Json(create_request()))
        .await
        .unwrap_err();

    assert_matches!(err, AppError::Conflict(_));
}

// An update that leaves ativo out keeps the stored value instead of
// re-activating the doctor.
#[tokio::test]
async fn update_doctor_keeps_stored_active_flag() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "nome": "Dra. Helena Prado",
            "especialidade_id": 3,
            "email": "helena@clinic.example",
            "crm_numero": "123456",
            "crm_uf": "SP",
            "ativo": false
        }])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("id", "eq.9"))
        .and(wiremock::matchers::body_partial_json(json!({ "ativo": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "nome": "Dra. Helena Prado",
            "especialidade_id": 3,
            "email": "helena@clinic.example",
            "crm_numero": "123456",
            "crm_uf": "SP",
            "ativo": false
        }])))
        .mount(&server)
        .await;

    let Json(body) = handlers::update_doctor(State(state), admin(), Path(9), Json(create_request()))
        .await
        .expect("update should succeed");

    assert_eq!(body["ativo"], false);
}

#[tokio::test]
async fn delete_doctor_maps_foreign_key_to_conflict() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "message": "update or delete on table \"medicos\" violates foreign key constraint"
        })))
        .mount(&server)
        .await;

    let err = handlers::delete_doctor(State(state), admin(), Path(9))
        .await
        .unwrap_err();

    assert_matches!(err, AppError::Conflict(_));
}

#[tokio::test]
async fn delete_doctor_returns_no_content() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 9 }])))
        .mount(&server)
        .await;

    let status = handlers::delete_doctor(State(state), admin(), Path(9))
        .await
        .expect("delete should succeed");

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn doctor_appointments_requires_existing_doctor() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("id", "eq.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = handlers::doctor_appointments(State(state), admin(), Path(99))
        .await
        .unwrap_err();

    assert_matches!(err, AppError::NotFound(_));
}

#[tokio::test]
async fn doctor_appointments_excludes_cancelled() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("id", "eq.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 9 }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/agendamentos"))
        .and(query_param("medico_id", "eq.9"))
        .and(query_param("status", "neq.cancelled"))
        .and(query_param("order", "data_hora.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 40,
            "data_hora": "2026-09-01T09:00:00",
            "status": "scheduled",
            "tipo_consulta": "primeira_consulta",
            "paciente": { "id": 2, "nome": "Ana Souza", "telefone": null }
        }])))
        .mount(&server)
        .await;

    let Json(body) = handlers::doctor_appointments(State(state), admin(), Path(9))
        .await
        .expect("listing should succeed");

    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["paciente"]["nome"], "Ana Souza");
}
