use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Lifecycle of a booked visit. Stored as plain strings; the enum is the
/// boundary that keeps free-form values out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Pending,
    ConfirmedByPatient,
    ReminderSent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    #[serde(rename = "paciente_id")]
    pub patient_id: i64,
    #[serde(rename = "medico_id")]
    pub doctor_id: i64,
    #[serde(rename = "data_hora")]
    pub starts_at: NaiveDateTime,
    pub status: AppointmentStatus,
    #[serde(rename = "status_confirmacao", default)]
    pub confirmation_status: Option<ConfirmationStatus>,
    #[serde(rename = "tipo_consulta", default)]
    pub consultation_type: Option<String>,
    #[serde(rename = "motivo_consulta", default)]
    pub reason: Option<String>,
    #[serde(rename = "observacoes_recepcao", default)]
    pub reception_notes: Option<String>,
    #[serde(rename = "lembrete_enviado", default)]
    pub reminder_sent: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// List row with the names the reception screen shows alongside each visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentListItem {
    pub id: i64,
    #[serde(rename = "paciente_id")]
    pub patient_id: i64,
    #[serde(rename = "medico_id")]
    pub doctor_id: i64,
    #[serde(rename = "data_hora")]
    pub starts_at: NaiveDateTime,
    pub status: AppointmentStatus,
    #[serde(rename = "status_confirmacao", default)]
    pub confirmation_status: Option<ConfirmationStatus>,
    #[serde(rename = "tipo_consulta", default)]
    pub consultation_type: Option<String>,
    #[serde(rename = "paciente", default)]
    pub patient: Option<PersonRef>,
    #[serde(rename = "medico", default)]
    pub doctor: Option<PersonRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Create payload keeps the split date/time fields the booking form submits.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    #[serde(rename = "paciente_id", default)]
    pub patient_id: Option<i64>,
    #[serde(rename = "medico_id", default)]
    pub doctor_id: Option<i64>,
    #[serde(rename = "data", default)]
    pub date: Option<String>,
    #[serde(rename = "horario", default)]
    pub time: Option<String>,
    #[serde(rename = "tipo_consulta", default)]
    pub consultation_type: Option<String>,
    #[serde(rename = "motivo_consulta", default)]
    pub reason: Option<String>,
    #[serde(rename = "observacoes_recepcao", default)]
    pub reception_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(rename = "paciente_id", default)]
    pub patient_id: Option<i64>,
    #[serde(rename = "medico_id", default)]
    pub doctor_id: Option<i64>,
    #[serde(rename = "data_hora", default)]
    pub starts_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "status_confirmacao", default)]
    pub confirmation_status: Option<ConfirmationStatus>,
    #[serde(rename = "tipo_consulta", default)]
    pub consultation_type: Option<String>,
    #[serde(rename = "motivo_consulta", default)]
    pub reason: Option<String>,
    #[serde(rename = "observacoes_recepcao", default)]
    pub reception_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentSearchQuery {
    pub search: Option<String>,
    pub status: Option<AppointmentStatus>,
    #[serde(rename = "medico_id")]
    pub doctor_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("The doctor already has an appointment at this time")]
    ConflictDetected,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::ConflictDetected => AppError::Conflict(err.to_string()),
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
