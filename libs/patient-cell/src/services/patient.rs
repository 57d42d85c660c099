use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use urlencoding::encode;

use shared_database::{DbError, PostgrestClient};
use shared_models::pagination::{page_window, Paginated};

use crate::models::{CreatePatientRequest, Patient, PatientError, PatientSearchQuery, UpdatePatientRequest};

pub struct PatientService {
    db: Arc<PostgrestClient>,
}

impl PatientService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        let name = required_name(&request)?;
        debug!("Creating patient record for: {}", name);

        if let Some(email) = request.email.as_deref().filter(|e| !e.is_empty()) {
            let existing: Vec<Value> = self
                .db
                .select("pacientes", &format!("select=id&email=eq.{}", encode(email)))
                .await
                .map_err(|e| PatientError::Database(e.to_string()))?;

            if !existing.is_empty() {
                return Err(PatientError::EmailTaken(email.to_string()));
            }
        }

        let now = Utc::now().to_rfc3339();
        let patient = self
            .db
            .insert(
                "pacientes",
                json!({
                    "nome": name,
                    "email": request.email,
                    "telefone": request.phone,
                    "convenio_id": request.insurance_plan_id,
                    "data_nascimento": request.date_of_birth,
                    "alergias": request.allergies,
                    "contato_emergencia_nome": request.emergency_contact_name,
                    "contato_emergencia_numero": request.emergency_contact_phone,
                    "created_at": now,
                    "updated_at": now,
                }),
            )
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => {
                    PatientError::EmailTaken(request.email.clone().unwrap_or_default())
                }
                other => PatientError::Database(other.to_string()),
            })?;

        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        let rows: Vec<Patient> = self
            .db
            .select("pacientes", &format!("id=eq.{}", patient_id))
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(PatientError::NotFound)
    }

    pub async fn update_patient(
        &self,
        patient_id: i64,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        let name = required_name(&request)?;
        debug!("Updating patient record: {}", patient_id);

        let rows: Vec<Patient> = self
            .db
            .update(
                "pacientes",
                &format!("id=eq.{}", patient_id),
                json!({
                    "nome": name,
                    "email": request.email,
                    "telefone": request.phone,
                    "convenio_id": request.insurance_plan_id,
                    "data_nascimento": request.date_of_birth,
                    "alergias": request.allergies,
                    "contato_emergencia_nome": request.emergency_contact_name,
                    "contato_emergencia_numero": request.emergency_contact_phone,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(PatientError::NotFound)
    }

    pub async fn delete_patient(&self, patient_id: i64) -> Result<(), PatientError> {
        let deleted = self
            .db
            .delete("pacientes", &format!("id=eq.{}", patient_id))
            .await
            .map_err(|e| match e {
                DbError::ForeignKeyViolation(_) => PatientError::HasAppointments,
                other => PatientError::Database(other.to_string()),
            })?;

        if deleted.is_empty() {
            return Err(PatientError::NotFound);
        }
        Ok(())
    }

    pub async fn search_patients(
        &self,
        query: PatientSearchQuery,
    ) -> Result<Paginated<Patient>, PatientError> {
        let (page, limit, offset) = page_window(query.page, query.limit);

        let mut query_parts = Vec::new();
        if let Some(term) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let term = encode(term);
            query_parts.push(format!("or=(nome.ilike.*{}*,email.ilike.*{}*)", term, term));
        }
        query_parts.push("order=nome.asc".to_string());
        query_parts.push(format!("limit={}&offset={}", limit, offset));

        let (patients, total) = self
            .db
            .select_with_count("pacientes", &query_parts.join("&"))
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        Ok(Paginated::new(patients, total, page, limit))
    }
}

fn required_name(request: &CreatePatientRequest) -> Result<String, PatientError> {
    request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PatientError::Validation("Patient name is required".to_string()))
}
