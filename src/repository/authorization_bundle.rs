//! Authorization bundle repository
//!
//! Bundles are immutable: there is no update operation.

use crate::error::{AppError, Result};
use crate::model::{AuthorizationBundle, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationBundleRepository: Send + Sync {
    /// Insert a fully-built bundle. The service layer validates component
    /// ownership and version existence before calling this.
    async fn create(&self, bundle: &AuthorizationBundle) -> Result<AuthorizationBundle>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<AuthorizationBundle>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationBundle>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct AuthorizationBundleRepositoryImpl {
    pool: MySqlPool,
}

impl AuthorizationBundleRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, name, policy_set_id, policy_set_version, entity_store_id, \
     entity_store_version, schema_id, schema_version, created_by, created_at";

#[async_trait]
impl AuthorizationBundleRepository for AuthorizationBundleRepositoryImpl {
    async fn create(&self, bundle: &AuthorizationBundle) -> Result<AuthorizationBundle> {
        sqlx::query(
            r#"
            INSERT INTO authorization_bundles
                (id, domain_id, name, policy_set_id, policy_set_version, entity_store_id,
                 entity_store_version, schema_id, schema_version, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&bundle.id)
        .bind(&bundle.domain_id)
        .bind(&bundle.name)
        .bind(&bundle.policy_set_id)
        .bind(bundle.policy_set_version)
        .bind(&bundle.entity_store_id)
        .bind(bundle.entity_store_version)
        .bind(&bundle.schema_id)
        .bind(bundle.schema_version)
        .bind(&bundle.created_by)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&bundle.id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to create authorization bundle"))
        })
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<AuthorizationBundle>> {
        let bundle = sqlx::query_as::<_, AuthorizationBundle>(&format!(
            "SELECT {} FROM authorization_bundles WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(bundle)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationBundle>> {
        let bundles = sqlx::query_as::<_, AuthorizationBundle>(&format!(
            "SELECT {} FROM authorization_bundles WHERE domain_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(bundles)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM authorization_bundles WHERE domain_id = ?")
                .bind(domain_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM authorization_bundles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Authorization bundle {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM authorization_bundles WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
