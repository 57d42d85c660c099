use std::sync::Arc;

use chrono::Duration;
use chrono_tz::Tz;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;

use crate::jwt::sign_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub database_rest_url: String,
    pub database_service_key: String,
    pub mail_api_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            database_rest_url: "http://localhost:54321".to_string(),
            database_service_key: "test-service-key".to_string(),
            mail_api_url: "http://localhost:54322".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the storage handle at a mock data-API server.
    pub fn with_database_url(url: &str) -> Self {
        Self {
            database_rest_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            database_rest_url: self.database_rest_url.clone(),
            database_service_key: self.database_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            mail_api_url: self.mail_api_url.clone(),
            mail_api_key: "test-mail-key".to_string(),
            mail_from: "clinica@example.com".to_string(),
            clinic_timezone: Tz::America__Sao_Paulo,
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::admin()
    }
}

impl TestUser {
    pub fn new(id: &str, username: &str, role: &str) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
        }
    }

    pub fn admin() -> Self {
        Self::new("1", "admin", "admin")
    }

    pub fn to_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            username: Some(self.username.clone()),
            role: Some(self.role.clone()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, ttl_hours: Option<i64>) -> String {
        sign_token(
            &user.id,
            &user.username,
            &user.role,
            secret,
            Duration::hours(ttl_hours.unwrap_or(24)),
        )
        .expect("failed to sign test token")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        sign_token(&user.id, &user.username, &user.role, secret, Duration::hours(-1))
            .expect("failed to sign test token")
    }
}
