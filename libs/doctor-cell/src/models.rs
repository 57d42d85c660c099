use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Summary shape used when a doctor's specialty is embedded in a response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtySummary {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "especialidade_id", default)]
    pub specialty_id: Option<i64>,
    #[serde(rename = "especialidade", default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<SpecialtySummary>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "crm_numero", default)]
    pub license_number: Option<String>,
    #[serde(rename = "crm_uf", default)]
    pub license_state: Option<String>,
    #[serde(rename = "foto_url", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "biografia", default)]
    pub bio: Option<String>,
    #[serde(rename = "ativo", default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "especialidade_id", default)]
    pub specialty_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "crm_numero", default)]
    pub license_number: Option<String>,
    #[serde(rename = "crm_uf", default)]
    pub license_state: Option<String>,
    #[serde(rename = "foto_url", default)]
    pub photo_url: Option<String>,
    #[serde(rename = "biografia", default)]
    pub bio: Option<String>,
    #[serde(rename = "ativo", default)]
    pub active: Option<bool>,
}

/// Full-replace update, mirroring the PUT semantics of the HTTP surface.
pub type UpdateDoctorRequest = CreateDoctorRequest;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub search: Option<String>,
    #[serde(rename = "especialidade_id")]
    pub specialty_id: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Row shape for a doctor's upcoming-appointments listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAppointmentRow {
    pub id: i64,
    #[serde(rename = "data_hora")]
    pub starts_at: NaiveDateTime,
    pub status: String,
    #[serde(rename = "tipo_consulta", default)]
    pub consultation_type: Option<String>,
    #[serde(rename = "paciente", default)]
    pub patient: Option<PatientSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
}

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("A doctor with this email or CRM already exists")]
    DuplicateRecord,

    #[error("Doctor has linked appointments and cannot be deleted")]
    HasAppointments,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::DuplicateRecord | DoctorError::HasAppointments => {
                AppError::Conflict(err.to_string())
            }
            DoctorError::Validation(msg) => AppError::ValidationError(msg),
            DoctorError::Database(msg) => AppError::Database(msg),
        }
    }
}
