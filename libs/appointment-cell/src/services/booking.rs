use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{json, Value};
use tracing::debug;
use urlencoding::encode;

use shared_database::{DbError, PostgrestClient};
use shared_models::pagination::{page_window, Paginated};

use crate::models::{
    Appointment, AppointmentError, AppointmentListItem, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::ConflictCheckService;

const LIST_COLUMNS: &str = "id,paciente_id,medico_id,data_hora,status,status_confirmacao,\
tipo_consulta,paciente:pacientes!inner(id,nome),medico:medicos!inner(id,nome)";

pub struct BookingService {
    db: Arc<PostgrestClient>,
    conflicts: ConflictCheckService,
}

impl BookingService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        let conflicts = ConflictCheckService::new(db.clone());
        Self { db, conflicts }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let patient_id = request
            .patient_id
            .ok_or_else(|| AppointmentError::Validation("Patient is required".to_string()))?;
        let doctor_id = request
            .doctor_id
            .ok_or_else(|| AppointmentError::Validation("Doctor is required".to_string()))?;
        let starts_at = parse_civil_datetime(request.date.as_deref(), request.time.as_deref())?;

        self.conflicts.assert_slot_free(doctor_id, starts_at, None).await?;
        debug!("Booking doctor {} at {}", doctor_id, starts_at);

        let now = Utc::now().to_rfc3339();
        self.db
            .insert(
                "agendamentos",
                json!({
                    "paciente_id": patient_id,
                    "medico_id": doctor_id,
                    "data_hora": starts_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    "status": AppointmentStatus::Scheduled.to_string(),
                    "status_confirmacao": "pending",
                    "tipo_consulta": request.consultation_type,
                    "motivo_consulta": request.reason,
                    "observacoes_recepcao": request.reception_notes,
                    "lembrete_enviado": false,
                    "created_at": now,
                    "updated_at": now,
                }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn get_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<AppointmentListItem, AppointmentError> {
        let rows: Vec<AppointmentListItem> = self
            .db
            .select(
                "agendamentos",
                &format!("select={}&id=eq.{}", LIST_COLUMNS, appointment_id),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let existing = self.fetch_plain(appointment_id).await?;

        let doctor_id = request.doctor_id.unwrap_or(existing.doctor_id);
        let starts_at = request.starts_at.unwrap_or(existing.starts_at);

        // The slot only needs re-checking when it actually moves.
        if doctor_id != existing.doctor_id || starts_at != existing.starts_at {
            self.conflicts
                .assert_slot_free(doctor_id, starts_at, Some(appointment_id))
                .await?;
        }
        debug!("Updating appointment {}", appointment_id);

        let rows: Vec<Appointment> = self
            .db
            .update(
                "agendamentos",
                &format!("id=eq.{}", appointment_id),
                json!({
                    "paciente_id": request.patient_id.unwrap_or(existing.patient_id),
                    "medico_id": doctor_id,
                    "data_hora": starts_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    "status": request.status.unwrap_or(existing.status).to_string(),
                    "status_confirmacao": request.confirmation_status.or(existing.confirmation_status),
                    "tipo_consulta": request.consultation_type.or(existing.consultation_type),
                    "motivo_consulta": request.reason.or(existing.reason),
                    "observacoes_recepcao": request.reception_notes.or(existing.reception_notes),
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn delete_appointment(&self, appointment_id: i64) -> Result<(), AppointmentError> {
        let deleted = self
            .db
            .delete("agendamentos", &format!("id=eq.{}", appointment_id))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if deleted.is_empty() {
            return Err(AppointmentError::NotFound);
        }
        Ok(())
    }

    pub async fn search_appointments(
        &self,
        query: AppointmentSearchQuery,
    ) -> Result<Paginated<AppointmentListItem>, AppointmentError> {
        let (page, limit, offset) = page_window(query.page, query.limit);

        let mut query_parts = vec![format!("select={}", LIST_COLUMNS)];
        if let Some(term) = query.search.as_deref().filter(|s| !s.is_empty()) {
            match self.search_filter(term).await? {
                Some(filter) => query_parts.push(filter),
                // No patient or doctor matches the term, so no appointment can.
                None => return Ok(Paginated::new(Vec::new(), 0, page, limit)),
            }
        }
        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(doctor_id) = query.doctor_id {
            query_parts.push(format!("medico_id=eq.{}", doctor_id));
        }
        query_parts.push("order=data_hora.desc".to_string());
        query_parts.push(format!("limit={}&offset={}", limit, offset));

        let (appointments, total) = self
            .db
            .select_with_count("agendamentos", &query_parts.join("&"))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(Paginated::new(appointments, total, page, limit))
    }

    /// The data API cannot OR one filter across two embedded tables, so a
    /// name search resolves matching patient and doctor ids first and the
    /// appointments are then filtered by id set. `None` means nobody matched.
    async fn search_filter(&self, term: &str) -> Result<Option<String>, AppointmentError> {
        let patient_ids = self.ids_matching("pacientes", term).await?;
        let doctor_ids = self.ids_matching("medicos", term).await?;

        let filter = match (patient_ids.is_empty(), doctor_ids.is_empty()) {
            (true, true) => return Ok(None),
            (false, true) => format!("paciente_id=in.({})", join_ids(&patient_ids)),
            (true, false) => format!("medico_id=in.({})", join_ids(&doctor_ids)),
            (false, false) => format!(
                "or=(paciente_id.in.({}),medico_id.in.({}))",
                join_ids(&patient_ids),
                join_ids(&doctor_ids)
            ),
        };
        Ok(Some(filter))
    }

    async fn ids_matching(&self, table: &str, term: &str) -> Result<Vec<i64>, AppointmentError> {
        let rows: Vec<Value> = self
            .db
            .select(table, &format!("select=id&nome=ilike.*{}*", encode(term)))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .collect())
    }

    async fn fetch_plain(&self, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        let rows: Vec<Appointment> = self
            .db
            .select("agendamentos", &format!("id=eq.{}", appointment_id))
            .await
            .map_err(|e| match e {
                DbError::NotFound => AppointmentError::NotFound,
                other => AppointmentError::Database(other.to_string()),
            })?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Combines the booking form's separate `data` and `horario` fields into one
/// civil timestamp. Malformed input fails here, before any query runs.
pub fn parse_civil_datetime(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<NaiveDateTime, AppointmentError> {
    let date = date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppointmentError::Validation("Date is required".to_string()))?;
    let time = time
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppointmentError::Validation("Time is required".to_string()))?;

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppointmentError::Validation(format!("Invalid date: {}", date)))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| AppointmentError::Validation(format!("Invalid time: {}", time)))?;

    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_date_and_minute_time() {
        let parsed = parse_civil_datetime(Some("2026-09-01"), Some("14:30")).unwrap();
        assert_eq!(parsed.format("%Y-%m-%dT%H:%M:%S").to_string(), "2026-09-01T14:30:00");
    }

    #[test]
    fn accepts_seconds_in_time() {
        let parsed = parse_civil_datetime(Some("2026-09-01"), Some("14:30:15")).unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "14:30:15");
    }

    #[test]
    fn rejects_missing_date() {
        assert!(matches!(
            parse_civil_datetime(None, Some("14:30")),
            Err(AppointmentError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(matches!(
            parse_civil_datetime(Some("01/09/2026"), Some("14:30")),
            Err(AppointmentError::Validation(_))
        ));
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(matches!(
            parse_civil_datetime(Some("2026-09-01"), Some("2pm")),
            Err(AppointmentError::Validation(_))
        ));
    }
}
