use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_cell::handlers;
use catalog_cell::models::{InsurancePlanRequest, SpecialtyRequest};
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

#[tokio::test]
async fn list_specialties_orders_by_name() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/especialidades"))
        .and(query_param("order", "nome.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 2, "nome": "Cardiologia" },
            { "id": 1, "nome": "Dermatologia" }
        ])))
        .mount(&server)
        .await;

    let Json(body) = handlers::list_specialties(State(state), admin())
        .await
        .expect("list should succeed");

    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["nome"], "Cardiologia");
}

#[tokio::test]
async fn create_specialty_requires_name() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    let err = handlers::create_specialty(
        State(state),
        admin(),
        Json(SpecialtyRequest { name: Some("   ".to_string()) }),
    )
    .await
    .unwrap_err();

    assert_matches!(err, AppError::ValidationError(_));
}

#[tokio::test]
async fn create_specialty_maps_unique_violation_to_conflict() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("POST"))
        .and(path("/rest/v1/especialidades"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"especialidades_nome_key\""
        })))
        .mount(&server)
        .await;

    let err = handlers::create_specialty(
        State(state),
        admin(),
        Json(SpecialtyRequest { name: Some("Cardiologia".to_string()) }),
    )
    .await
    .unwrap_err();

    assert_matches!(err, AppError::Conflict(_));
}

#[tokio::test]
async fn delete_specialty_maps_foreign_key_to_conflict() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/especialidades"))
        .and(query_param("id", "eq.4"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23503",
            "message": "update or delete on table \"especialidades\" violates foreign key constraint"
        })))
        .mount(&server)
        .await;

    let err = handlers::delete_specialty(State(state), admin(), Path(4))
        .await
        .unwrap_err();

    assert_matches!(err, AppError::Conflict(_));
}

#[tokio::test]
async fn create_insurance_plan_returns_created_row() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("POST"))
        .and(path("/rest/v1/convenios"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": 7,
            "nome": "Unimed",
            "registro_ans": "123456"
        }])))
        .mount(&server)
        .await;

    let (status, Json(body)) = handlers::create_insurance_plan(
        State(state),
        admin(),
        Json(InsurancePlanRequest {
            name: Some("Unimed".to_string()),
            ans_code: Some("123456".to_string()),
        }),
    )
    .await
    .expect("create should succeed");

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 7);
    assert_eq!(body["registro_ans"], "123456");
}

#[tokio::test]
async fn update_insurance_plan_handles_missing_row() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/convenios"))
        .and(query_param("id", "eq.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = handlers::update_insurance_plan(
        State(state),
        admin(),
        Path(99),
        Json(InsurancePlanRequest {
            name: Some("Amil".to_string()),
            ans_code: None,
        }),
    )
    .await
    .unwrap_err();

    assert_matches!(err, AppError::NotFound(_));
}

#[tokio::test]
async fn delete_insurance_plan_returns_no_content() {
    let server = MockServer::start().await;
    let state = test_state(&server);

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/convenios"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 7 }])))
        .mount(&server)
        .await;

    let status = handlers::delete_insurance_plan(State(state), admin(), Path(7))
        .await
        .expect("delete should succeed");

    assert_eq!(status, StatusCode::NO_CONTENT);
}
