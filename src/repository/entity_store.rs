//! Entity store repository
//!
//! Same append-only versioning convention as the policy set repository.

use crate::error::{AppError, Result};
use crate::model::{EntityStore, EntityStoreVersion, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

const COLUMNS: &str = "id, domain_id, name, description, latest_version, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, entity_store_id, version, entities, created_by, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStoreRepository: Send + Sync {
    async fn create<'a>(
        &self,
        domain_id: &UuidStr,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<EntityStore>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<EntityStore>>;
    async fn find_by_name(&self, domain_id: &UuidStr, name: &str) -> Result<Option<EntityStore>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<EntityStore>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update_meta<'a>(
        &self,
        id: &UuidStr,
        name: Option<&'a str>,
        description: Option<&'a str>,
    ) -> Result<EntityStore>;
    async fn append_version<'a>(
        &self,
        entity_store_id: &UuidStr,
        entities: &serde_json::Value,
        created_by: Option<&'a str>,
    ) -> Result<EntityStoreVersion>;
    async fn list_versions(
        &self,
        entity_store_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<EntityStoreVersion>>;
    async fn count_versions(&self, entity_store_id: &UuidStr) -> Result<i64>;
    async fn find_version(
        &self,
        entity_store_id: &UuidStr,
        version: i64,
    ) -> Result<Option<EntityStoreVersion>>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct EntityStoreRepositoryImpl {
    pool: MySqlPool,
}

impl EntityStoreRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStoreRepository for EntityStoreRepositoryImpl {
    async fn create<'a>(
        &self,
        domain_id: &UuidStr,
        name: &str,
        description: Option<&'a str>,
    ) -> Result<EntityStore> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO entity_stores (id, domain_id, name, description, latest_version, created_at, updated_at)
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
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create entity store")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<EntityStore>> {
        let store = sqlx::query_as::<_, EntityStore>(&format!(
            "SELECT {} FROM entity_stores WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    async fn find_by_name(&self, domain_id: &UuidStr, name: &str) -> Result<Option<EntityStore>> {
        let store = sqlx::query_as::<_, EntityStore>(&format!(
            "SELECT {} FROM entity_stores WHERE domain_id = ? AND name = ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<EntityStore>> {
        let stores = sqlx::query_as::<_, EntityStore>(&format!(
            "SELECT {} FROM entity_stores WHERE domain_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entity_stores WHERE domain_id = ?")
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
    ) -> Result<EntityStore> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entity store {} not found", id)))?;

        let name = name.unwrap_or(&existing.name);
        let description = description.or(existing.description.as_deref());

        sqlx::query(
            "UPDATE entity_stores SET name = ?, description = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update entity store")))
    }

    async fn append_version<'a>(
        &self,
        entity_store_id: &UuidStr,
        entities: &serde_json::Value,
        created_by: Option<&'a str>,
    ) -> Result<EntityStoreVersion> {
        let entities_json =
            serde_json::to_string(entities).map_err(|e| AppError::Internal(e.into()))?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(i64,)> =
            sqlx::query_as("SELECT latest_version FROM entity_stores WHERE id = ? FOR UPDATE")
                .bind(entity_store_id)
                .fetch_optional(&mut *tx)
                .await?;

        let latest = row
            .ok_or_else(|| {
                AppError::NotFound(format!("Entity store {} not found", entity_store_id))
            })?
            .0;
        let next = latest + 1;
        let version_id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO entity_store_versions (id, entity_store_id, version, entities, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&version_id)
        .bind(entity_store_id)
        .bind(next)
        .bind(&entities_json)
        .bind(created_by)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE entity_stores SET latest_version = ?, updated_at = NOW() WHERE id = ?")
            .bind(next)
            .bind(entity_store_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_version(entity_store_id, next)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to append version")))
    }

    async fn list_versions(
        &self,
        entity_store_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<EntityStoreVersion>> {
        let versions = sqlx::query_as::<_, EntityStoreVersion>(&format!(
            "SELECT {} FROM entity_store_versions WHERE entity_store_id = ? \
             ORDER BY version DESC LIMIT ? OFFSET ?",
            VERSION_COLUMNS
        ))
        .bind(entity_store_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(versions)
    }

    async fn count_versions(&self, entity_store_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM entity_store_versions WHERE entity_store_id = ?",
        )
        .bind(entity_store_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn find_version(
        &self,
        entity_store_id: &UuidStr,
        version: i64,
    ) -> Result<Option<EntityStoreVersion>> {
        let row = sqlx::query_as::<_, EntityStoreVersion>(&format!(
            "SELECT {} FROM entity_store_versions WHERE entity_store_id = ? AND version = ?",
            VERSION_COLUMNS
        ))
        .bind(entity_store_id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM entity_store_versions WHERE entity_store_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM entity_stores WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("Entity store {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE v FROM entity_store_versions v \
             JOIN entity_stores s ON s.id = v.entity_store_id WHERE s.domain_id = ?",
        )
        .bind(domain_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM entity_stores WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
