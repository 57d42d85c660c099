use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

/// Patient record. Wire/database names stay in Portuguese, matching the
/// schema the administrative frontend was built against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "convenio_id", default)]
    pub insurance_plan_id: Option<i64>,
    #[serde(rename = "data_nascimento", default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "alergias", default)]
    pub allergies: Option<String>,
    #[serde(rename = "contato_emergencia_nome", default)]
    pub emergency_contact_name: Option<String>,
    #[serde(rename = "contato_emergencia_numero", default)]
    pub emergency_contact_phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(rename = "convenio_id", default)]
    pub insurance_plan_id: Option<i64>,
    #[serde(rename = "data_nascimento", default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "alergias", default)]
    pub allergies: Option<String>,
    #[serde(rename = "contato_emergencia_nome", default)]
    pub emergency_contact_name: Option<String>,
    #[serde(rename = "contato_emergencia_numero", default)]
    pub emergency_contact_phone: Option<String>,
}

/// Full-replace update, mirroring the PUT semantics of the HTTP surface.
pub type UpdatePatientRequest = CreatePatientRequest;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientSearchQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("A patient with email {0} already exists")]
    EmailTaken(String),

    #[error("Patient has linked appointments and cannot be deleted")]
    HasAppointments,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::EmailTaken(_) | PatientError::HasAppointments => {
                AppError::Conflict(err.to_string())
            }
            PatientError::Validation(msg) => AppError::ValidationError(msg),
            PatientError::Database(msg) => AppError::Database(msg),
        }
    }
}
