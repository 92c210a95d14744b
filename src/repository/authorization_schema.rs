//! Authorization schema repository
//!
//! Same append-only versioning convention as the policy set repository.

use crate::error::{AppError, Result};
use crate::model::{AuthorizationSchema, AuthorizationSchemaVersion, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

const COLUMNS: &str = "id, domain_id, name, description, latest_version, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, schema_id, version, `schema`, created_by, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationSchemaRepository: Send + Sync {
    async fn create<'a>(
        &self,
        domain_id: &UuidStr,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<AuthorizationSchema>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<AuthorizationSchema>>;
    async fn find_by_name(
        &self,
        domain_id: &UuidStr,
        name: &str,
    ) -> Result<Option<AuthorizationSchema>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationSchema>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update_meta<'a>(
        &self,
        id: &UuidStr,
        name: Option<&'a str>,
        description: Option<&'a str>,
    ) -> Result<AuthorizationSchema>;
    async fn append_version<'a>(
        &self,
        schema_id: &UuidStr,
        schema: &serde_json::Value,
        created_by: Option<&'a str>,
    ) -> Result<AuthorizationSchemaVersion>;
    async fn list_versions(
        &self,
        schema_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationSchemaVersion>>;
    async fn count_versions(&self, schema_id: &UuidStr) -> Result<i64>;
    async fn find_version(
        &self,
        schema_id: &UuidStr,
        version: i64,
    ) -> Result<Option<AuthorizationSchemaVersion>>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct AuthorizationSchemaRepositoryImpl {
    pool: MySqlPool,
}

impl AuthorizationSchemaRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationSchemaRepository for AuthorizationSchemaRepositoryImpl {
    async fn create<'a>(
        &self,
        domain_id: &UuidStr,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<AuthorizationSchema> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO authorization_schemas (id, domain_id, name, description, latest_version, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to create authorization schema"))
        })
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<AuthorizationSchema>> {
        let schema = sqlx::query_as::<_, AuthorizationSchema>(&format!(
            "SELECT {} FROM authorization_schemas WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schema)
    }

    async fn find_by_name(
        &self,
        domain_id: &UuidStr,
        name: &str,
    ) -> Result<Option<AuthorizationSchema>> {
        let schema = sqlx::query_as::<_, AuthorizationSchema>(&format!(
            "SELECT {} FROM authorization_schemas WHERE domain_id = ? AND name = ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schema)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationSchema>> {
        let schemas = sqlx::query_as::<_, AuthorizationSchema>(&format!(
            "SELECT {} FROM authorization_schemas WHERE domain_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(schemas)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM authorization_schemas WHERE domain_id = ?")
                .bind(domain_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn update_meta<'a>(
        &self,
        id: &UuidStr,
        name: Option<&'a str>,
        description: Option<&'a str>,
    ) -> Result<AuthorizationSchema> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Authorization schema {} not found", id)))?;

        let name = name.unwrap_or(&existing.name);
        let description = description.or(existing.description.as_deref());

        sqlx::query(
            "UPDATE authorization_schemas SET name = ?, description = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("Failed to update authorization schema"))
        })
    }

    async fn append_version<'a>(
        &self,
        schema_id: &UuidStr,
        schema: &serde_json::Value,
        created_by: Option<&'a str>,
    ) -> Result<AuthorizationSchemaVersion> {
        let schema_json =
            serde_json::to_string(schema).map_err(|e| AppError::Internal(e.into()))?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT latest_version FROM authorization_schemas WHERE id = ? FOR UPDATE",
        )
        .bind(schema_id)
        .fetch_optional(&mut *tx)
        .await?;

        let latest = row
            .ok_or_else(|| {
                AppError::NotFound(format!("Authorization schema {} not found", schema_id))
            })?
            .0;
        let next = latest + 1;
        let version_id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO authorization_schema_versions (id, schema_id, version, `schema`, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&version_id)
        .bind(schema_id)
        .bind(next)
        .bind(&schema_json)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE authorization_schemas SET latest_version = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(next)
        .bind(schema_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_version(schema_id, next)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to append version")))
    }

    async fn list_versions(
        &self,
        schema_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizationSchemaVersion>> {
        let versions = sqlx::query_as::<_, AuthorizationSchemaVersion>(&format!(
            "SELECT {} FROM authorization_schema_versions WHERE schema_id = ? \
             ORDER BY version DESC LIMIT ? OFFSET ?",
            VERSION_COLUMNS
        ))
        .bind(schema_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(versions)
    }

    async fn count_versions(&self, schema_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM authorization_schema_versions WHERE schema_id = ?",
        )
        .bind(schema_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn find_version(
        &self,
        schema_id: &UuidStr,
        version: i64,
    ) -> Result<Option<AuthorizationSchemaVersion>> {
        let row = sqlx::query_as::<_, AuthorizationSchemaVersion>(&format!(
            "SELECT {} FROM authorization_schema_versions WHERE schema_id = ? AND version = ?",
            VERSION_COLUMNS
        ))
        .bind(schema_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM authorization_schema_versions WHERE schema_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM authorization_schemas WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "Authorization schema {} not found",
                id
            )));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE v FROM authorization_schema_versions v \
             JOIN authorization_schemas s ON s.id = v.schema_id WHERE s.domain_id = ?",
        )
        .bind(domain_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM authorization_schemas WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
