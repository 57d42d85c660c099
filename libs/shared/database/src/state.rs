use std::sync::Arc;

use shared_config::AppConfig;

use crate::postgrest::PostgrestClient;

/// Shared per-process state: configuration plus the storage handle. Handed to
/// every router as `Arc<AppState>` at construction instead of living behind a
/// process-wide global.
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<PostgrestClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let db = Arc::new(PostgrestClient::new(&config));
        Self {
            config: Arc::new(config),
            db,
        }
    }
}
