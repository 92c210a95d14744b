//! Identity provider repository

use crate::error::{AppError, Result};
use crate::model::{
    CreateIdentityProviderInput, IdentityProvider, Reference, UpdateIdentityProviderInput, UuidStr,
};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProviderRepository: Send + Sync {
    async fn create(
        &self,
        reference: &Reference,
        input: &CreateIdentityProviderInput,
    ) -> Result<IdentityProvider>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<IdentityProvider>>;
    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<IdentityProvider>>;
    async fn count_by_reference(&self, reference: &Reference) -> Result<i64>;
    async fn update(
        &self,
        id: &UuidStr,
        input: &UpdateIdentityProviderInput,
    ) -> Result<IdentityProvider>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64>;
}

pub struct IdentityProviderRepositoryImpl {
    pool: MySqlPool,
}

impl IdentityProviderRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, reference_type, reference_id, name, provider_type, configuration, \
     mappers, external, created_at, updated_at";

#[async_trait]
impl IdentityProviderRepository for IdentityProviderRepositoryImpl {
    async fn create(
        &self,
        reference: &Reference,
        input: &CreateIdentityProviderInput,
    ) -> Result<IdentityProvider> {
        let id = UuidStr::new_v4();
        let configuration = input
            .configuration
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));
        let mappers = input.mappers.clone().unwrap_or_else(|| serde_json::json!([]));
        let configuration_json =
            serde_json::to_string(&configuration).map_err(|e| AppError::Internal(e.into()))?;
        let mappers_json =
            serde_json::to_string(&mappers).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO identity_providers
                (id, reference_type, reference_id, name, provider_type, configuration,
                 mappers, external, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(&input.name)
        .bind(&input.provider_type)
        .bind(&configuration_json)
        .bind(&mappers_json)
        .bind(input.external)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to create identity provider"))
        })
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<IdentityProvider>> {
        let provider = sqlx::query_as::<_, IdentityProvider>(&format!(
            "SELECT {} FROM identity_providers WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(provider)
    }

    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<IdentityProvider>> {
        let providers = sqlx::query_as::<_, IdentityProvider>(&format!(
            "SELECT {} FROM identity_providers WHERE reference_type = ? AND reference_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(providers)
    }

    async fn count_by_reference(&self, reference: &Reference) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM identity_providers WHERE reference_type = ? AND reference_id = ?",
        )
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        id: &UuidStr,
        input: &UpdateIdentityProviderInput,
    ) -> Result<IdentityProvider> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Identity provider {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let configuration = input
            .configuration
            .as_ref()
            .unwrap_or(&existing.configuration);
        let mappers = input.mappers.as_ref().unwrap_or(&existing.mappers);
        let configuration_json =
            serde_json::to_string(configuration).map_err(|e| AppError::Internal(e.into()))?;
        let mappers_json =
            serde_json::to_string(mappers).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE identity_providers
            SET name = ?, configuration = ?, mappers = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(&configuration_json)
        .bind(&mappers_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to update identity provider"))
        })
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM identity_providers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Identity provider {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM identity_providers WHERE reference_type = ? AND reference_id = ?",
        )
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
