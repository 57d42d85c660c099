use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use shared_database::{DbError, PostgrestClient};

use crate::models::{CatalogError, Specialty, SpecialtyRequest};

const LABEL: &str = "Specialty";

pub struct SpecialtyService {
    db: Arc<PostgrestClient>,
}

impl SpecialtyService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Specialty>, CatalogError> {
        self.db
            .select("especialidades", "select=id,nome&order=nome.asc")
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))
    }

    pub async fn get(&self, id: i64) -> Result<Specialty, CatalogError> {
        let rows: Vec<Specialty> = self
            .db
            .select("especialidades", &format!("id=eq.{}", id))
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(CatalogError::NotFound(LABEL))
    }

    pub async fn create(&self, request: SpecialtyRequest) -> Result<Specialty, CatalogError> {
        let name = required_name(request.name)?;
        debug!("Creating specialty: {}", name);

        self.db
            .insert("especialidades", json!({ "nome": name }))
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => CatalogError::NameTaken(LABEL),
                other => CatalogError::Database(other.to_string()),
            })
    }

    pub async fn update(&self, id: i64, request: SpecialtyRequest) -> Result<Specialty, CatalogError> {
        let name = required_name(request.name)?;

        let rows: Vec<Specialty> = self
            .db
            .update("especialidades", &format!("id=eq.{}", id), json!({ "nome": name }))
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => CatalogError::NameTaken(LABEL),
                other => CatalogError::Database(other.to_string()),
            })?;

        rows.into_iter().next().ok_or(CatalogError::NotFound(LABEL))
    }

    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        let deleted = self
            .db
            .delete("especialidades", &format!("id=eq.{}", id))
            .await
            .map_err(|e| match e {
                DbError::ForeignKeyViolation(_) => CatalogError::InUse(LABEL),
                other => CatalogError::Database(other.to_string()),
            })?;

        if deleted.is_empty() {
            return Err(CatalogError::NotFound(LABEL));
        }
        Ok(())
    }
}

pub(crate) fn required_name(name: Option<String>) -> Result<String, CatalogError> {
    name.as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CatalogError::Validation("Name is required".to_string()))
}
