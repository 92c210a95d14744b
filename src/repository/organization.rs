//! Organization repository

use crate::error::{AppError, Result};
use crate::model::{CreateOrganizationInput, Organization, UpdateOrganizationInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn create(&self, input: &CreateOrganizationInput) -> Result<Organization>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Organization>>;
    async fn find_by_hrid(&self, hrid: &str) -> Result<Option<Organization>>;
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Organization>>;
    async fn count(&self) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateOrganizationInput) -> Result<Organization>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
}

pub struct OrganizationRepositoryImpl {
    pool: MySqlPool,
}

impl OrganizationRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, name, description, hrids, created_at, updated_at";

#[async_trait]
impl OrganizationRepository for OrganizationRepositoryImpl {
    async fn create(&self, input: &CreateOrganizationInput) -> Result<Organization> {
        let id = UuidStr::new_v4();
        let hrids = input.hrids.clone().unwrap_or_default();
        let hrids_json =
            serde_json::to_string(&hrids).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, description, hrids, created_at, updated_at)
            VALUES (?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&hrids_json)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create organization")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    async fn find_by_hrid(&self, hrid: &str) -> Result<Option<Organization>> {
        let organization = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations WHERE JSON_CONTAINS(hrids, JSON_QUOTE(?))",
            COLUMNS
        ))
        .bind(hrid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Organization>> {
        let organizations = sqlx::query_as::<_, Organization>(&format!(
            "SELECT {} FROM organizations ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(organizations)
    }

    async fn count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM organizations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateOrganizationInput) -> Result<Organization> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Organization {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let hrids = input.hrids.as_ref().unwrap_or(&existing.hrids);
        let hrids_json =
            serde_json::to_string(hrids).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE organizations
            SET name = ?, description = ?, hrids = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(&hrids_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update organization")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Organization {} not found", id)));
        }

        Ok(())
    }
}
