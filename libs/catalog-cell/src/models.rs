use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecialtyRequest {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePlan {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "registro_ans", default)]
    pub ans_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsurancePlanRequest {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "registro_ans", default)]
    pub ans_code: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} name already exists")]
    NameTaken(&'static str),

    #[error("{0} is referenced by other records and cannot be deleted")]
    InUse(&'static str),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => AppError::NotFound(err.to_string()),
            CatalogError::NameTaken(_) | CatalogError::InUse(_) => AppError::Conflict(err.to_string()),
            CatalogError::Validation(msg) => AppError::ValidationError(msg),
            CatalogError::Database(msg) => AppError::Database(msg),
        }
    }
}
