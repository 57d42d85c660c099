use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use shared_database::AppState;

use crate::models::ReminderError;
use crate::services::{HttpMailer, Mailer, ReminderSweepService};

/// Runs the reminder sweep every 30 minutes. Ticks are independent; a failed
/// run is logged and the next tick retries the whole window.
pub async fn start_reminder_scheduler(state: Arc<AppState>) -> Result<(), ReminderError> {
    let scheduler = JobScheduler::new()
        .await
        .map_err(|e| ReminderError::Scheduler(e.to_string()))?;

    let mailer: Arc<dyn Mailer> = Arc::new(HttpMailer::new(&state.config));
    let job_state = state.clone();

    let job = Job::new_async("0 0,30 * * * *", move |_uuid, _lock| {
        let state = job_state.clone();
        let mailer = mailer.clone();

        Box::pin(async move {
            let sweep = ReminderSweepService::new(
                state.db.clone(),
                mailer,
                state.config.clinic_timezone,
            );
            if let Err(e) = sweep.run_sweep(Utc::now()).await {
                error!("Reminder sweep failed: {}", e);
            }
        })
    })
    .map_err(|e| ReminderError::Scheduler(e.to_string()))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| ReminderError::Scheduler(e.to_string()))?;
    scheduler
        .start()
        .await
        .map_err(|e| ReminderError::Scheduler(e.to_string()))?;

    info!("Reminder scheduler started");

    Ok(())
}
