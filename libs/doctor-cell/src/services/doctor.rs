use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use serde_json::{json, Value};
use tracing::debug;
use urlencoding::encode;

use shared_database::{DbError, PostgrestClient};
use shared_models::pagination::{page_window, Paginated};

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorAppointmentRow, DoctorError, DoctorSearchQuery,
    UpdateDoctorRequest,
};

const DOCTOR_COLUMNS: &str = "*,especialidade:especialidades(id,nome)";

pub struct DoctorService {
    db: Arc<PostgrestClient>,
}

impl DoctorService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        let fields = RequiredFields::check(&request)?;
        debug!("Creating doctor record for: {}", fields.name);

        let now = Utc::now().to_rfc3339();
        self.db
            .insert(
                "medicos",
                json!({
                    "nome": fields.name,
                    "especialidade_id": fields.specialty_id,
                    "email": fields.email,
                    "telefone": request.phone,
                    "crm_numero": fields.license_number,
                    "crm_uf": fields.license_state,
                    "foto_url": request.photo_url,
                    "biografia": request.bio,
                    "ativo": request.active.unwrap_or(true),
                    "created_at": now,
                    "updated_at": now,
                }),
            )
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => DoctorError::DuplicateRecord,
                other => DoctorError::Database(other.to_string()),
            })
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        let rows: Vec<Doctor> = self
            .db
            .select(
                "medicos",
                &format!("select={}&id=eq.{}", DOCTOR_COLUMNS, doctor_id),
            )
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: i64,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        let fields = RequiredFields::check(&request)?;
        debug!("Updating doctor record: {}", doctor_id);

        // A PUT that omits ativo keeps the stored value; an inactive doctor
        // must not come back active as a side effect.
        let active = match request.active {
            Some(active) => active,
            None => self.get_doctor(doctor_id).await?.active,
        };

        let rows: Vec<Doctor> = self
            .db
            .update(
                "medicos",
                &format!("id=eq.{}", doctor_id),
                json!({
                    "nome": fields.name,
                    "especialidade_id": fields.specialty_id,
                    "email": fields.email,
                    "telefone": request.phone,
                    "crm_numero": fields.license_number,
                    "crm_uf": fields.license_state,
                    "foto_url": request.photo_url,
                    "biografia": request.bio,
                    "ativo": active,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => DoctorError::DuplicateRecord,
                other => DoctorError::Database(other.to_string()),
            })?;

        rows.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<(), DoctorError> {
        let deleted = self
            .db
            .delete("medicos", &format!("id=eq.{}", doctor_id))
            .await
            .map_err(|e| match e {
                DbError::ForeignKeyViolation(_) => DoctorError::HasAppointments,
                other => DoctorError::Database(other.to_string()),
            })?;

        if deleted.is_empty() {
            return Err(DoctorError::NotFound);
        }
        Ok(())
    }

    pub async fn search_doctors(
        &self,
        query: DoctorSearchQuery,
    ) -> Result<Paginated<Doctor>, DoctorError> {
        let (page, limit, offset) = page_window(query.page, query.limit);

        let mut query_parts = vec![format!("select={}", DOCTOR_COLUMNS)];
        if let Some(term) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let term = encode(term);
            query_parts.push(format!("or=(nome.ilike.*{}*,email.ilike.*{}*)", term, term));
        }
        if let Some(specialty_id) = query.specialty_id {
            query_parts.push(format!("especialidade_id=eq.{}", specialty_id));
        }
        query_parts.push("order=nome.asc".to_string());
        query_parts.push(format!("limit={}&offset={}", limit, offset));

        let (doctors, total) = self
            .db
            .select_with_count("medicos", &query_parts.join("&"))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(Paginated::new(doctors, total, page, limit))
    }

    /// Appointments for one doctor from `from` onward, soonest first.
    /// Cancelled slots are left out; the reception screen only cares about
    /// visits that can still happen.
    pub async fn upcoming_appointments(
        &self,
        doctor_id: i64,
        from: NaiveDateTime,
    ) -> Result<Vec<DoctorAppointmentRow>, DoctorError> {
        // Existence check first so a missing doctor reads as 404, not an
        // empty agenda.
        let doctor: Vec<Value> = self
            .db
            .select("medicos", &format!("select=id&id=eq.{}", doctor_id))
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;
        if doctor.is_empty() {
            return Err(DoctorError::NotFound);
        }

        let query = format!(
            "select=id,data_hora,status,tipo_consulta,paciente:pacientes(id,nome,telefone)\
             &medico_id=eq.{}&data_hora=gte.{}&status=neq.cancelled&order=data_hora.asc",
            doctor_id,
            from.format("%Y-%m-%dT%H:%M:%S"),
        );

        self.db
            .select("agendamentos", &query)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }
}

struct RequiredFields {
    name: String,
    specialty_id: i64,
    email: String,
    license_number: String,
    license_state: String,
}

impl RequiredFields {
    fn check(request: &CreateDoctorRequest) -> Result<Self, DoctorError> {
        let name = non_empty(request.name.as_deref(), "Doctor name is required")?;
        let specialty_id = request
            .specialty_id
            .ok_or_else(|| DoctorError::Validation("Specialty is required".to_string()))?;
        let email = non_empty(request.email.as_deref(), "Doctor email is required")?;
        let license_number = non_empty(request.license_number.as_deref(), "CRM number is required")?;
        let license_state =
            non_empty(request.license_state.as_deref(), "CRM state is required")?.to_uppercase();

        if license_state.len() != 2 || !license_state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DoctorError::Validation(
                "CRM state must be a two-letter UF code".to_string(),
            ));
        }

        Ok(Self {
            name,
            specialty_id,
            email,
            license_number,
            license_state,
        })
    }
}

fn non_empty(value: Option<&str>, message: &str) -> Result<String, DoctorError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DoctorError::Validation(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateDoctorRequest {
        CreateDoctorRequest {
            name: Some("Dra. Helena Prado".to_string()),
            specialty_id: Some(3),
            email: Some("helena@clinic.example".to_string()),
            phone: None,
            license_number: Some("123456".to_string()),
            license_state: Some("sp".to_string()),
            photo_url: None,
            bio: None,
            active: None,
        }
    }

    #[test]
    fn uppercases_license_state() {
        let fields = RequiredFields::check(&full_request()).unwrap();
        assert_eq!(fields.license_state, "SP");
    }

    #[test]
    fn rejects_missing_specialty() {
        let mut request = full_request();
        request.specialty_id = None;
        assert!(matches!(
            RequiredFields::check(&request),
            Err(DoctorError::Validation(_))
        ));
    }

    #[test]
    fn rejects_bad_uf_code() {
        let mut request = full_request();
        request.license_state = Some("S1".to_string());
        assert!(matches!(
            RequiredFields::check(&request),
            Err(DoctorError::Validation(_))
        ));
    }
}
