use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

/// Appointment row as selected for the sweep, with the embedded contact
/// details the email needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ReminderRow {
    pub id: i64,
    #[serde(rename = "data_hora")]
    pub starts_at: NaiveDateTime,
    #[serde(rename = "paciente")]
    pub patient: PatientContact,
    #[serde(rename = "medico")]
    pub doctor: DoctorRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatientContact {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoctorRef {
    #[serde(rename = "nome")]
    pub name: String,
}

/// Outcome of one sweep run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub matched: usize,
    pub sent: usize,
    pub skipped_no_email: usize,
    pub failed: usize,
}

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Reminder query failed: {0}")]
    Query(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}
