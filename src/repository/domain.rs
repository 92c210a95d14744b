//! Domain repository

use crate::error::{AppError, Result};
use crate::model::{CreateDomainInput, Domain, UpdateDomainInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRepository: Send + Sync {
    async fn create(&self, organization_id: &UuidStr, input: &CreateDomainInput) -> Result<Domain>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Domain>>;
    async fn find_by_hrid(&self, organization_id: &UuidStr, hrid: &str) -> Result<Option<Domain>>;
    async fn list_by_organization(
        &self,
        organization_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Domain>>;
    async fn count_by_organization(&self, organization_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateDomainInput) -> Result<Domain>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
}

pub struct DomainRepositoryImpl {
    pool: MySqlPool,
}

impl DomainRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, organization_id, name, hrid, description, enabled, created_at, updated_at";

#[async_trait]
impl DomainRepository for DomainRepositoryImpl {
    async fn create(&self, organization_id: &UuidStr, input: &CreateDomainInput) -> Result<Domain> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO domains (id, organization_id, name, hrid, description, enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, TRUE, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(organization_id)
        .bind(&input.name)
        .bind(&input.hrid)
        .bind(&input.description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create domain")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Domain>> {
        let domain = sqlx::query_as::<_, Domain>(&format!(
            "SELECT {} FROM domains WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(domain)
    }

    async fn find_by_hrid(&self, organization_id: &UuidStr, hrid: &str) -> Result<Option<Domain>> {
        let domain = sqlx::query_as::<_, Domain>(&format!(
            "SELECT {} FROM domains WHERE organization_id = ? AND hrid = ?",
            COLUMNS
        ))
        .bind(organization_id)
        .bind(hrid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(domain)
    }

    async fn list_by_organization(
        &self,
        organization_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Domain>> {
        let domains = sqlx::query_as::<_, Domain>(&format!(
            "SELECT {} FROM domains WHERE organization_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(domains)
    }

    async fn count_by_organization(&self, organization_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM domains WHERE organization_id = ?")
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateDomainInput) -> Result<Domain> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Domain {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let enabled = input.enabled.unwrap_or(existing.enabled);

        sqlx::query(
            r#"
            UPDATE domains
            SET name = ?, description = ?, enabled = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(enabled)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update domain")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM domains WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Domain {} not found", id)));
        }

        Ok(())
    }
}
