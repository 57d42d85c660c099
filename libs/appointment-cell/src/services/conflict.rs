use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use shared_database::PostgrestClient;

use crate::models::AppointmentError;

/// Pre-insert existence check for the one-visit-per-slot rule. Cancelled
/// appointments do not hold their slot.
///
/// The check and the following write are separate statements, so two
/// concurrent bookings for the same slot can both pass. A partial unique
/// index on (medico_id, data_hora) where status <> 'cancelled' would close
/// that window at the database.
pub struct ConflictCheckService {
    db: Arc<PostgrestClient>,
}

impl ConflictCheckService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    /// Errors with `ConflictDetected` when the doctor already has a live
    /// appointment at exactly `at`. `exclude_id` keeps an update from
    /// colliding with the row being updated.
    pub async fn assert_slot_free(
        &self,
        doctor_id: i64,
        at: NaiveDateTime,
        exclude_id: Option<i64>,
    ) -> Result<(), AppointmentError> {
        let query = conflict_query(doctor_id, at, exclude_id);
        debug!("Checking slot for doctor {} at {}", doctor_id, at);

        let rows: Vec<Value> = self
            .db
            .select("agendamentos", &query)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if rows.is_empty() {
            Ok(())
        } else {
            Err(AppointmentError::ConflictDetected)
        }
    }
}

fn conflict_query(doctor_id: i64, at: NaiveDateTime, exclude_id: Option<i64>) -> String {
    let mut query = format!(
        "select=id&medico_id=eq.{}&data_hora=eq.{}&status=neq.cancelled",
        doctor_id,
        at.format("%Y-%m-%dT%H:%M:%S"),
    );
    if let Some(id) = exclude_id {
        query.push_str(&format!("&id=neq.{}", id));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slot() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 1)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn query_matches_exact_slot_and_skips_cancelled() {
        assert_eq!(
            conflict_query(7, slot(), None),
            "select=id&medico_id=eq.7&data_hora=eq.2026-09-01T14:30:00&status=neq.cancelled"
        );
    }

    #[test]
    fn query_excludes_own_row_on_update() {
        assert!(conflict_query(7, slot(), Some(42)).ends_with("&id=neq.42"));
    }
}
