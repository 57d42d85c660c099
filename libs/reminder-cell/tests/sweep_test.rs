use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reminder_cell::services::{MailError, Mailer, ReminderSweepService};
use shared_database::AppState;
use shared_utils::test_utils::TestConfig;

/// Records every dispatch; addresses listed in `fail_for` error instead.
#[derive(Default)]
struct FakeMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail_for: Vec<String>,
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> Result<(), MailError> {
        if self.fail_for.iter().any(|f| f == to) {
            return Err(MailError::Request("connection refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

fn sweep_service(server: &MockServer, mailer: Arc<FakeMailer>) -> ReminderSweepService {
    let config = TestConfig::with_database_url(&server.uri()).to_app_config();
    let state = AppState::new(config);
    ReminderSweepService::new(state.db.clone(), mailer, Tz::America__Sao_Paulo)
}

fn anchor() -> chrono::DateTime<Utc> {
    // 10:00 civil time in São Paulo on 2024-06-10.
    Utc.with_ymd_and_hms(2024, 6, 10, 13, 0, 0).unwrap()
}

fn reminder_row(id: i64, email: Option<&str>) -> serde_json::Value {
    json!({
        "id": id,
        "data_hora": "2024-06-11T09:00:00",
        "paciente": { "nome": "Ana Souza", "email": email },
        "medico": { "nome": "Dra. Helena Prado" }
    })
}

async fn mount_window(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/agendamentos"))
        .and(query_param("data_hora", "gte.2024-06-11T00:00:00"))
        .and(query_param("status", "eq.scheduled"))
        .and(query_param(
            "or",
            "(lembrete_enviado.is.null,lembrete_enviado.eq.false)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sweep_sends_and_flags_each_row() {
    let server = MockServer::start().await;
    let mailer = Arc::new(FakeMailer::default());
    let sweep = sweep_service(&server, mailer.clone());

    mount_window(
        &server,
        json!([
            reminder_row(40, Some("ana@example.com")),
            reminder_row(41, Some("bruno@example.com"))
        ]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/agendamentos"))
        .and(body_partial_json(json!({ "lembrete_enviado": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 40 }])))
        .expect(2)
        .mount(&server)
        .await;

    let report = sweep.run_sweep(anchor()).await.expect("sweep should succeed");

    assert_eq!(report.matched, 2);
    assert_eq!(report.sent, 2);
    assert_eq!(report.failed, 0);

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, "ana@example.com");
}

#[tokio::test]
async fn sweep_skips_patient_without_email() {
    let server = MockServer::start().await;
    let mailer = Arc::new(FakeMailer::default());
    let sweep = sweep_service(&server, mailer.clone());

    mount_window(
        &server,
        json!([
            reminder_row(40, None),
            reminder_row(41, Some("bruno@example.com"))
        ]),
    )
    .await;

    // Only the row that was actually emailed gets its flag set.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/agendamentos"))
        .and(query_param("id", "eq.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 41 }])))
        .expect(1)
        .mount(&server)
        .await;

    let report = sweep.run_sweep(anchor()).await.expect("sweep should succeed");

    assert_eq!(report.matched, 2);
    assert_eq!(report.sent, 1);
    assert_eq!(report.skipped_no_email, 1);
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn dispatch_failure_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let mailer = Arc::new(FakeMailer {
        sent: Mutex::new(Vec::new()),
        fail_for: vec!["ana@example.com".to_string()],
    });
    let sweep = sweep_service(&server, mailer.clone());

    mount_window(
        &server,
        json!([
            reminder_row(40, Some("ana@example.com")),
            reminder_row(41, Some("bruno@example.com"))
        ]),
    )
    .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/agendamentos"))
        .and(query_param("id", "eq.41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 41 }])))
        .expect(1)
        .mount(&server)
        .await;

    let report = sweep.run_sweep(anchor()).await.expect("sweep should succeed");

    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn query_failure_aborts_the_run() {
    let server = MockServer::start().await;
    let mailer = Arc::new(FakeMailer::default());
    let sweep = sweep_service(&server, mailer.clone());

    Mock::given(method("GET"))
        .and(path("/rest/v1/agendamentos"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "internal error"
        })))
        .mount(&server)
        .await;

    let result = sweep.run_sweep(anchor()).await;

    assert!(result.is_err());
    assert!(mailer.sent.lock().unwrap().is_empty());
}

// Flagged rows fall out of the selection, so a second sweep over the same
// window has nothing to send.
#[tokio::test]
async fn second_sweep_sends_nothing_new() {
    let server = MockServer::start().await;
    let mailer = Arc::new(FakeMailer::default());
    let sweep = sweep_service(&server, mailer.clone());

    mount_window(&server, json!([])).await;

    let report = sweep.run_sweep(anchor()).await.expect("sweep should succeed");

    assert_eq!(report.matched, 0);
    assert_eq!(report.sent, 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
}
