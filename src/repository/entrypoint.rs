//! Entrypoint repository

use crate::error::{AppError, Result};
use crate::model::{CreateEntrypointInput, Entrypoint, UpdateEntrypointInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntrypointRepository: Send + Sync {
    async fn create(
        &self,
        organization_id: &UuidStr,
        input: &CreateEntrypointInput,
    ) -> Result<Entrypoint>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Entrypoint>>;
    async fn list_by_organization(
        &self,
        organization_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Entrypoint>>;
    async fn count_by_organization(&self, organization_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateEntrypointInput) -> Result<Entrypoint>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_organization(&self, organization_id: &UuidStr) -> Result<u64>;
}

pub struct EntrypointRepositoryImpl {
    pool: MySqlPool,
}

impl EntrypointRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, organization_id, name, url, description, tags, \
     default_entrypoint, created_at, updated_at";

#[async_trait]
impl EntrypointRepository for EntrypointRepositoryImpl {
    async fn create(
        &self,
        organization_id: &UuidStr,
        input: &CreateEntrypointInput,
    ) -> Result<Entrypoint> {
        let id = UuidStr::new_v4();
        let tags = input.tags.clone().unwrap_or_default();
        let tags_json = serde_json::to_string(&tags).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO entrypoints
                (id, organization_id, name, url, description, tags, default_entrypoint,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, FALSE, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(organization_id)
        .bind(&input.name)
        .bind(&input.url)
        .bind(&input.description)
        .bind(&tags_json)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create entrypoint")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Entrypoint>> {
        let entrypoint = sqlx::query_as::<_, Entrypoint>(&format!(
            "SELECT {} FROM entrypoints WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entrypoint)
    }

    async fn list_by_organization(
        &self,
        organization_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Entrypoint>> {
        let entrypoints = sqlx::query_as::<_, Entrypoint>(&format!(
            "SELECT {} FROM entrypoints WHERE organization_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(entrypoints)
    }

    async fn count_by_organization(&self, organization_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM entrypoints WHERE organization_id = ?")
                .bind(organization_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateEntrypointInput) -> Result<Entrypoint> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entrypoint {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let url = input.url.as_ref().unwrap_or(&existing.url);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let tags = input.tags.as_ref().unwrap_or(&existing.tags);
        let tags_json = serde_json::to_string(tags).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE entrypoints
            SET name = ?, url = ?, description = ?, tags = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(url)
        .bind(description)
        .bind(&tags_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update entrypoint")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM entrypoints WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Entrypoint {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_organization(&self, organization_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM entrypoints WHERE organization_id = ?")
            .bind(organization_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
