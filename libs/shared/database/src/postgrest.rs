use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

// PostgreSQL error codes surfaced through the data API.
const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("row not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("database request failed: {0}")]
    Request(String),
}

/// Storage-access handle executing parameterized queries against a PostgREST
/// data API. Injected into every service so tests can point it at a fake
/// server instead of a shared global.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    service_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::from_parts(&config.database_rest_url, &config.database_service_key)
    }

    pub fn from_parts(base_url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    /// SELECT rows from `table` filtered by a PostgREST query string.
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request_raw(Method::GET, table, query, None, None)
            .await?;
        Self::decode_rows(response).await
    }

    /// SELECT with `Prefer: count=exact`; returns the page of rows plus the
    /// total row count taken from the Content-Range header.
    pub async fn select_with_count<T>(&self, table: &str, query: &str) -> Result<(Vec<T>, i64), DbError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request_raw(Method::GET, table, query, Some("count=exact"), None)
            .await?;

        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| DbError::Request("missing or malformed Content-Range header".to_string()))?;

        let rows = Self::decode_rows(response).await?;
        Ok((rows, total))
    }

    /// INSERT a single row, returning the persisted representation.
    pub async fn insert<T>(&self, table: &str, body: Value) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request_raw(Method::POST, table, "", Some("return=representation"), Some(body))
            .await?;

        let mut rows: Vec<T> = Self::decode_rows(response).await?;
        if rows.is_empty() {
            return Err(DbError::Request("insert returned no representation".to_string()));
        }
        Ok(rows.remove(0))
    }

    /// UPDATE rows matching `filter`; returns the updated representations
    /// (empty when nothing matched).
    pub async fn update<T>(&self, table: &str, filter: &str, body: Value) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request_raw(Method::PATCH, table, filter, Some("return=representation"), Some(body))
            .await?;
        Self::decode_rows(response).await
    }

    /// DELETE rows matching `filter`; returns the deleted representations so
    /// callers can distinguish "nothing matched" from success.
    pub async fn delete(&self, table: &str, filter: &str) -> Result<Vec<Value>, DbError> {
        let response = self
            .request_raw(Method::DELETE, table, filter, Some("return=representation"), None)
            .await?;
        Self::decode_rows(response).await
    }

    async fn request_raw(
        &self,
        method: Method,
        table: &str,
        query: &str,
        prefer: Option<&'static str>,
        body: Option<Value>,
    ) -> Result<reqwest::Response, DbError> {
        let url = if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        };
        debug!("database request: {} {}", method, url);

        let headers = self.headers(prefer)?;
        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DbError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("database error ({}): {}", status, text);
            return Err(classify_error(status, &text));
        }

        Ok(response)
    }

    fn headers(&self, prefer: Option<&'static str>) -> Result<HeaderMap, DbError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.service_key)
            .map_err(|_| DbError::Request("invalid service key".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.service_key))
            .map_err(|_| DbError::Request("invalid service key".to_string()))?;

        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_static(prefer));
        }

        Ok(headers)
    }

    async fn decode_rows<T>(response: reqwest::Response) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned,
    {
        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| DbError::Request(format!("failed to decode rows: {}", e)))
    }
}

/// Maps a failed data-API response onto the error taxonomy. Constraint
/// violations carry a PostgreSQL error code in the JSON body.
fn classify_error(status: StatusCode, body: &str) -> DbError {
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(str::to_owned))
        .unwrap_or_default();

    match code.as_str() {
        PG_UNIQUE_VIOLATION => DbError::UniqueViolation(body.to_string()),
        PG_FOREIGN_KEY_VIOLATION => DbError::ForeignKeyViolation(body.to_string()),
        _ if status == StatusCode::NOT_FOUND => DbError::NotFound,
        _ => DbError::Request(format!("{}: {}", status, body)),
    }
}

/// Parses the total out of a Content-Range header ("0-9/57" or "*/57").
fn parse_content_range_total(value: &str) -> Option<i64> {
    value.rsplit('/').next()?.parse().ok()
}
