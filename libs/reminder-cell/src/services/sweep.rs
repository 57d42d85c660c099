use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tracing::{error, info, warn};

use shared_database::PostgrestClient;

use crate::models::{ReminderError, ReminderRow, SweepReport};
use crate::services::Mailer;

/// Finds tomorrow's appointments and emails each patient once.
///
/// Sends and flag updates are per-row: one bad address or transient mail
/// failure does not stop the rest of the batch, and the unflagged row is
/// retried on the next tick (at-least-once delivery).
pub struct ReminderSweepService {
    db: Arc<PostgrestClient>,
    mailer: Arc<dyn Mailer>,
    timezone: Tz,
}

impl ReminderSweepService {
    pub fn new(db: Arc<PostgrestClient>, mailer: Arc<dyn Mailer>, timezone: Tz) -> Self {
        Self { db, mailer, timezone }
    }

    pub async fn run_sweep(&self, now: DateTime<Utc>) -> Result<SweepReport, ReminderError> {
        let (start, end) = reminder_window(now, self.timezone);
        info!("Reminder sweep over [{}, {})", start, end);

        let rows: Vec<ReminderRow> = self
            .db
            .select("agendamentos", &window_query(start, end))
            .await
            .map_err(|e| ReminderError::Query(e.to_string()))?;

        let mut report = SweepReport {
            matched: rows.len(),
            ..SweepReport::default()
        };

        for row in rows {
            let Some(email) = row.patient.email.as_deref().filter(|e| !e.is_empty()) else {
                warn!(
                    "Appointment {} has no patient email, skipping reminder",
                    row.id
                );
                report.skipped_no_email += 1;
                continue;
            };

            let subject = "Lembrete de consulta";
            let html = reminder_body(&row);

            if let Err(e) = self.mailer.send(email, subject, &html).await {
                error!("Failed to send reminder for appointment {}: {}", row.id, e);
                report.failed += 1;
                continue;
            }

            if let Err(e) = self.mark_reminder_sent(row.id).await {
                error!(
                    "Reminder sent but flag update failed for appointment {}: {}",
                    row.id, e
                );
                report.failed += 1;
                continue;
            }

            report.sent += 1;
        }

        info!(
            "Reminder sweep done: {} matched, {} sent, {} without email, {} failed",
            report.matched, report.sent, report.skipped_no_email, report.failed
        );
        Ok(report)
    }

    async fn mark_reminder_sent(&self, appointment_id: i64) -> Result<(), ReminderError> {
        self.db
            .update::<serde_json::Value>(
                "agendamentos",
                &format!("id=eq.{}", appointment_id),
                json!({ "lembrete_enviado": true }),
            )
            .await
            .map_err(|e| ReminderError::Query(e.to_string()))?;
        Ok(())
    }
}

/// Calendar-day window for "tomorrow" in the clinic's civil timezone:
/// `[next midnight, midnight after)`.
pub fn reminder_window(now: DateTime<Utc>, timezone: Tz) -> (NaiveDateTime, NaiveDateTime) {
    let today = now.with_timezone(&timezone).date_naive();
    let start = (today + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap();
    let end = (today + Duration::days(2)).and_hms_opt(0, 0, 0).unwrap();
    (start, end)
}

fn window_query(start: NaiveDateTime, end: NaiveDateTime) -> String {
    format!(
        "select=id,data_hora,paciente:pacientes!inner(nome,email),medico:medicos!inner(nome)\
         &data_hora=gte.{}&data_hora=lt.{}&status=eq.scheduled\
         &or=(lembrete_enviado.is.null,lembrete_enviado.eq.false)&order=data_hora.asc",
        start.format("%Y-%m-%dT%H:%M:%S"),
        end.format("%Y-%m-%dT%H:%M:%S"),
    )
}

fn reminder_body(row: &ReminderRow) -> String {
    format!(
        "<p>Olá, {patient}!</p>\
         <p>Este é um lembrete da sua consulta com {doctor} amanhã, \
         dia {date} às {time}.</p>\
         <p>Em caso de imprevisto, entre em contato com a recepção.</p>",
        patient = row.patient.name,
        doctor = row.doctor.name,
        date = row.starts_at.format("%d/%m/%Y"),
        time = row.starts_at.format("%H:%M"),
    )
}
