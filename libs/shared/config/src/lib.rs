use std::env;

use chrono_tz::Tz;
use tracing::warn;

const DEFAULT_TIMEZONE: Tz = Tz::America__Sao_Paulo;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_rest_url: String,
    pub database_service_key: String,
    pub jwt_secret: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    /// Civil timezone used for calendar-day boundaries (reminder windows,
    /// "today" cutoffs), regardless of server-local time.
    pub clinic_timezone: Tz,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_rest_url: env::var("DATABASE_REST_URL").unwrap_or_else(|_| {
                warn!("DATABASE_REST_URL not set, using empty value");
                String::new()
            }),
            database_service_key: env::var("DATABASE_SERVICE_KEY").unwrap_or_else(|_| {
                warn!("DATABASE_SERVICE_KEY not set, using empty value");
                String::new()
            }),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                warn!("JWT_SECRET not set, using empty value");
                String::new()
            }),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or_else(|_| {
                warn!("MAIL_API_URL not set, using empty value");
                String::new()
            }),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_else(|_| {
                warn!("MAIL_API_KEY not set, using empty value");
                String::new()
            }),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| {
                warn!("MAIL_FROM not set, using empty value");
                String::new()
            }),
            clinic_timezone: env::var("CLINIC_TIMEZONE")
                .ok()
                .and_then(|name| match name.parse::<Tz>() {
                    Ok(tz) => Some(tz),
                    Err(_) => {
                        warn!("CLINIC_TIMEZONE '{}' is not a valid IANA name, using default", name);
                        None
                    }
                })
                .unwrap_or(DEFAULT_TIMEZONE),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_rest_url.is_empty()
            && !self.database_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_api_url.is_empty() && !self.mail_api_key.is_empty() && !self.mail_from.is_empty()
    }
}
