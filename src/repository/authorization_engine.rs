//! Authorization engine repository

use crate::error::{AppError, Result};
use crate::model::{
    AuthorizationEngine, CreateAuthorizationEngineInput, UpdateAuthorizationEngineInput, UuidStr,
};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationEngineRepository: Send + Sync {
    async fn create(
        &self,
        domain_id: &UuidStr,
        input: &CreateAuthorizationEngineInput,
    ) -> Result<AuthorizationEngine>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<AuthorizationEngine>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationEngine>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update(
        &self,
        id: &UuidStr,
        input: &UpdateAuthorizationEngineInput,
    ) -> Result<AuthorizationEngine>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct AuthorizationEngineRepositoryImpl {
    pool: MySqlPool,
}

impl AuthorizationEngineRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, name, engine_type, endpoint_url, configuration, enabled, \
     created_at, updated_at";

#[async_trait]
impl AuthorizationEngineRepository for AuthorizationEngineRepositoryImpl {
    async fn create(
        &self,
        domain_id: &UuidStr,
        input: &CreateAuthorizationEngineInput,
    ) -> Result<AuthorizationEngine> {
        let id = UuidStr::new_v4();
        let configuration = input
            .configuration
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));
        let configuration_json =
            serde_json::to_string(&configuration).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO authorization_engines
                (id, domain_id, name, engine_type, endpoint_url, configuration, enabled,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, TRUE, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(&input.name)
        .bind(input.engine_type)
        .bind(&input.endpoint_url)
        .bind(&configuration_json)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to create authorization engine"))
        })
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<AuthorizationEngine>> {
        let engine = sqlx::query_as::<_, AuthorizationEngine>(&format!(
            "SELECT {} FROM authorization_engines WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(engine)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationEngine>> {
        let engines = sqlx::query_as::<_, AuthorizationEngine>(&format!(
            "SELECT {} FROM authorization_engines WHERE domain_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(engines)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM authorization_engines WHERE domain_id = ?")
                .bind(domain_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        id: &UuidStr,
        input: &UpdateAuthorizationEngineInput,
    ) -> Result<AuthorizationEngine> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Authorization engine {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let endpoint_url = input.endpoint_url.as_ref().unwrap_or(&existing.endpoint_url);
        let configuration = input
            .configuration
            .as_ref()
            .unwrap_or(&existing.configuration);
        let enabled = input.enabled.unwrap_or(existing.enabled);
        let configuration_json =
            serde_json::to_string(configuration).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE authorization_engines
            SET name = ?, endpoint_url = ?, configuration = ?, enabled = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(endpoint_url)
        .bind(&configuration_json)
        .bind(enabled)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to update authorization engine"))
        })
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM authorization_engines WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Authorization engine {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM authorization_engines WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
