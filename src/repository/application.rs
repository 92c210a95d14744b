//! Application repository

use crate::error::{AppError, Result};
use crate::model::{Application, UpdateApplicationInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a fully-built application. The service layer generates client
    /// credentials before calling this.
    async fn create(&self, application: &Application) -> Result<Application>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Application>>;
    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Application>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Application>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateApplicationInput) -> Result<Application>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct ApplicationRepositoryImpl {
    pool: MySqlPool,
}

impl ApplicationRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, name, app_type, description, client_id, client_secret, \
     redirect_uris, grant_types, template, enabled, created_at, updated_at";

#[async_trait]
impl ApplicationRepository for ApplicationRepositoryImpl {
    async fn create(&self, application: &Application) -> Result<Application> {
        let redirect_uris = serde_json::to_string(&application.redirect_uris)
            .map_err(|e| AppError::Internal(e.into()))?;
        let grant_types = serde_json::to_string(&application.grant_types)
            .map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO applications
                (id, domain_id, name, app_type, description, client_id, client_secret,
                 redirect_uris, grant_types, template, enabled, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&application.id)
        .bind(&application.domain_id)
        .bind(&application.name)
        .bind(application.app_type)
        .bind(&application.description)
        .bind(&application.client_id)
        .bind(&application.client_secret)
        .bind(&redirect_uris)
        .bind(&grant_types)
        .bind(application.template)
        .bind(application.enabled)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&application.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create application")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn find_by_client_id(&self, client_id: &str) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE client_id = ?",
            COLUMNS
        ))
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(application)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE domain_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM applications WHERE domain_id = ?")
                .bind(domain_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateApplicationInput) -> Result<Application> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let redirect_uris = input
            .redirect_uris
            .as_ref()
            .unwrap_or(&existing.redirect_uris);
        let grant_types = input.grant_types.as_ref().unwrap_or(&existing.grant_types);
        let enabled = input.enabled.unwrap_or(existing.enabled);

        let redirect_uris_json =
            serde_json::to_string(redirect_uris).map_err(|e| AppError::Internal(e.into()))?;
        let grant_types_json =
            serde_json::to_string(grant_types).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE applications
            SET name = ?, description = ?, redirect_uris = ?, grant_types = ?, enabled = ?,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(&redirect_uris_json)
        .bind(&grant_types_json)
        .bind(enabled)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update application")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM applications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Application {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM applications WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
