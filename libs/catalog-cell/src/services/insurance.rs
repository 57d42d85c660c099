use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use shared_database::{DbError, PostgrestClient};

use crate::models::{CatalogError, InsurancePlan, InsurancePlanRequest};
use crate::services::specialty::required_name;

const LABEL: &str = "Insurance plan";

pub struct InsurancePlanService {
    db: Arc<PostgrestClient>,
}

impl InsurancePlanService {
    pub fn new(db: Arc<PostgrestClient>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<InsurancePlan>, CatalogError> {
        self.db
            .select("convenios", "order=nome.asc")
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))
    }

    pub async fn get(&self, id: i64) -> Result<InsurancePlan, CatalogError> {
        let rows: Vec<InsurancePlan> = self
            .db
            .select("convenios", &format!("id=eq.{}", id))
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(CatalogError::NotFound(LABEL))
    }

    pub async fn create(&self, request: InsurancePlanRequest) -> Result<InsurancePlan, CatalogError> {
        let name = required_name(request.name)?;
        debug!("Creating insurance plan: {}", name);

        self.db
            .insert(
                "convenios",
                json!({ "nome": name, "registro_ans": request.ans_code }),
            )
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation(_) => CatalogError::NameTaken(LABEL),
                other => CatalogError::Database(other.to_string()),
            })
    }

    pub async fn update(
        &self,
        id: i64,
        request: InsurancePlanRequest,
    ) -> Result<InsurancePlan, CatalogError> {
        let name = required_name(request.name)?;

        let rows: Vec<InsurancePlan> = self
            .db
            .update(
                "convenios",
                &format!("id=eq.{}", id),
                json!({ "nome": name, "registro_ans": request.ans_code }),
            )
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
            .delete("convenios", &format!("id=eq.{}", id))
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
