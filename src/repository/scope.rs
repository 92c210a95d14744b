//! OAuth2 scope repository

use crate::error::{AppError, Result};
use crate::model::{CreateScopeInput, Scope, UpdateScopeInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScopeRepository: Send + Sync {
    async fn create(&self, domain_id: &UuidStr, input: &CreateScopeInput) -> Result<Scope>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Scope>>;
    async fn find_by_key(&self, domain_id: &UuidStr, key: &str) -> Result<Option<Scope>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Scope>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateScopeInput) -> Result<Scope>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct ScopeRepositoryImpl {
    pool: MySqlPool,
}

impl ScopeRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, domain_id, `key`, name, description, discovery, expires_in, created_at, updated_at";

#[async_trait]
impl ScopeRepository for ScopeRepositoryImpl {
    async fn create(&self, domain_id: &UuidStr, input: &CreateScopeInput) -> Result<Scope> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO scopes
                (id, domain_id, `key`, name, description, discovery, expires_in, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(&input.key)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.discovery)
        .bind(input.expires_in)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create scope")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Scope>> {
        let scope = sqlx::query_as::<_, Scope>(&format!(
            "SELECT {} FROM scopes WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(scope)
    }

    async fn find_by_key(&self, domain_id: &UuidStr, key: &str) -> Result<Option<Scope>> {
        let scope = sqlx::query_as::<_, Scope>(&format!(
            "SELECT {} FROM scopes WHERE domain_id = ? AND `key` = ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(scope)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Scope>> {
        let scopes = sqlx::query_as::<_, Scope>(&format!(
            "SELECT {} FROM scopes WHERE domain_id = ? ORDER BY `key` ASC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(scopes)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scopes WHERE domain_id = ?")
            .bind(domain_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateScopeInput) -> Result<Scope> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Scope {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let discovery = input.discovery.unwrap_or(existing.discovery);
        let expires_in = input.expires_in.or(existing.expires_in);

        sqlx::query(
            r#"
            UPDATE scopes
            SET name = ?, description = ?, discovery = ?, expires_in = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(discovery)
        .bind(expires_in)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update scope")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM scopes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Scope {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM scopes WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
