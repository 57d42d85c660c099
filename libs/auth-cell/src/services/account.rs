use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, warn};
use urlencoding::encode;

use shared_database::{DbError, PostgrestClient};
use shared_utils::jwt::sign_token;

use crate::models::{Account, AccountRow, AuthError, LoginRequest, RegisterRequest};

const TOKEN_TTL_HOURS: i64 = 1;

pub struct AccountService {
    db: Arc<PostgrestClient>,
}

impl AccountService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    /// Verifies credentials against the stored argon2 hash and issues a
    /// short-lived bearer token.
    pub async fn login(&self, request: LoginRequest, jwt_secret: &str) -> Result<String, AuthError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        debug!("Login attempt for username: {}", username);

        let rows: Vec<AccountRow> = self
            .db
            .select("usuarios", &format!("username=eq.{}", encode(username)))
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let Some(account) = rows.into_iter().next() else {
            warn!("Login failed: unknown username {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if Argon2::default()
            .verify_password(request.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            warn!("Login failed: bad password for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = sign_token(
            &account.id.to_string(),
            &account.username,
            "admin",
            jwt_secret,
            Duration::hours(TOKEN_TTL_HOURS),
        )
        .map_err(AuthError::Token)?;

        debug!("Login succeeded for user {}", account.id);
        Ok(token)
    }

    /// Creates an account with a freshly hashed password. Username collisions
    /// are rejected before the insert; a racing duplicate is still caught by
    /// the unique constraint.
    pub async fn register(&self, request: RegisterRequest) -> Result<Account, AuthError> {
        let username = request.username.trim().to_string();
        if username.is_empty() || request.password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let existing: Vec<Value> = self
            .db
            .select(
                "usuarios",
                &format!("select=id&username=eq.{}", encode(&username)),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        if !existing.is_empty() {
            return Err(AuthError::UsernameTaken);
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(request.password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();

        let row: AccountRow = self
            .db
            .insert(
                "usuarios",
                json!({
                    "username": username,
                    "password_hash": password_hash,
                    "created_at": Utc::now().to_rfc3339(),
                }),
            )
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => AuthError::UsernameTaken,
                other => AuthError::Database(other.to_string()),
            })?;

        debug!("Account created with ID: {}", row.id);
        Ok(row.into())
    }
}
