//! Policy set repository
//!
//! Version rows are append-only: `append_version` inserts the next version
//! inside a transaction and bumps the parent's `latest_version`. Version rows
//! are never updated and only removed together with their parent.

use crate::error::{AppError, Result};
use crate::model::{PolicySet, PolicySetVersion, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

const COLUMNS: &str = "id, domain_id, name, description, latest_version, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, policy_set_id, version, content, created_by, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolicySetRepository: Send + Sync {
    async fn create<'a>(
        &self,
        domain_id: &UuidStr,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<PolicySet>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<PolicySet>>;
    async fn find_by_name(&self, domain_id: &UuidStr, name: &str) -> Result<Option<PolicySet>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PolicySet>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update_meta<'a>(
        &self,
        id: &UuidStr,
        name: Option<&'a str>,
        description: Option<&'a str>,
    ) -> Result<PolicySet>;
    /// Insert the next version row and bump the parent's `latest_version`.
    async fn append_version<'a>(
        &self,
        policy_set_id: &UuidStr,
        content: &str,
        created_by: Option<&'a str>,
    ) -> Result<PolicySetVersion>;
    async fn list_versions(
        &self,
        policy_set_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PolicySetVersion>>;
    async fn count_versions(&self, policy_set_id: &UuidStr) -> Result<i64>;
    async fn find_version(
        &self,
        policy_set_id: &UuidStr,
        version: i64,
    ) -> Result<Option<PolicySetVersion>>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct PolicySetRepositoryImpl {
    pool: MySqlPool,
}

impl PolicySetRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicySetRepository for PolicySetRepositoryImpl {
    async fn create<'a>(
        &self,
        domain_id: &UuidStr,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<PolicySet> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO policy_sets (id, domain_id, name, description, latest_version, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create policy set")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<PolicySet>> {
        let set = sqlx::query_as::<_, PolicySet>(&format!(
            "SELECT {} FROM policy_sets WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(set)
    }

    async fn find_by_name(&self, domain_id: &UuidStr, name: &str) -> Result<Option<PolicySet>> {
        let set = sqlx::query_as::<_, PolicySet>(&format!(
            "SELECT {} FROM policy_sets WHERE domain_id = ? AND name = ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(set)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PolicySet>> {
        let sets = sqlx::query_as::<_, PolicySet>(&format!(
            "SELECT {} FROM policy_sets WHERE domain_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(sets)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM policy_sets WHERE domain_id = ?")
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
    ) -> Result<PolicySet> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Policy set {} not found", id)))?;

        let name = name.unwrap_or(&existing.name);
        let description = description.or(existing.description.as_deref());

        sqlx::query(
            "UPDATE policy_sets SET name = ?, description = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update policy set")))
    }

    async fn append_version<'a>(
        &self,
        policy_set_id: &UuidStr,
        content: &str,
        created_by: Option<&'a str>,
    ) -> Result<PolicySetVersion> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i64,)> =
            sqlx::query_as("SELECT latest_version FROM policy_sets WHERE id = ? FOR UPDATE")
                .bind(policy_set_id)
                .fetch_optional(&mut *tx)
                .await?;

        let latest = row
            .ok_or_else(|| AppError::NotFound(format!("Policy set {} not found", policy_set_id)))?
            .0;
        let next = latest + 1;
        let version_id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO policy_set_versions (id, policy_set_id, version, content, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&version_id)
        .bind(policy_set_id)
        .bind(next)
        .bind(content)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE policy_sets SET latest_version = ?, updated_at = NOW() WHERE id = ?")
            .bind(next)
            .bind(policy_set_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_version(policy_set_id, next)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to append version")))
    }

    async fn list_versions(
        &self,
        policy_set_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PolicySetVersion>> {
        let versions = sqlx::query_as::<_, PolicySetVersion>(&format!(
            "SELECT {} FROM policy_set_versions WHERE policy_set_id = ? \
             ORDER BY version DESC LIMIT ? OFFSET ?",
            VERSION_COLUMNS
        ))
        .bind(policy_set_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(versions)
    }

    async fn count_versions(&self, policy_set_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM policy_set_versions WHERE policy_set_id = ?")
                .bind(policy_set_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn find_version(
        &self,
        policy_set_id: &UuidStr,
        version: i64,
    ) -> Result<Option<PolicySetVersion>> {
        let row = sqlx::query_as::<_, PolicySetVersion>(&format!(
            "SELECT {} FROM policy_set_versions WHERE policy_set_id = ? AND version = ?",
            VERSION_COLUMNS
        ))
        .bind(policy_set_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM policy_set_versions WHERE policy_set_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM policy_sets WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Policy set {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE v FROM policy_set_versions v \
             JOIN policy_sets p ON p.id = v.policy_set_id WHERE p.domain_id = ?",
        )
        .bind(domain_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM policy_sets WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
