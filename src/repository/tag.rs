//! Sharding tag repository

use crate::error::{AppError, Result};
use crate::model::{Tag, UpdateTagInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a fully-built tag. The service layer derives the key from the
    /// name before calling this.
    async fn create(&self, tag: &Tag) -> Result<Tag>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Tag>>;
    async fn find_by_key(&self, organization_id: &UuidStr, key: &str) -> Result<Option<Tag>>;
    async fn list_by_organization(
        &self,
        organization_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Tag>>;
    async fn count_by_organization(&self, organization_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateTagInput) -> Result<Tag>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_organization(&self, organization_id: &UuidStr) -> Result<u64>;
}

pub struct TagRepositoryImpl {
    pool: MySqlPool,
}

impl TagRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, organization_id, `key`, name, description, created_at, updated_at";

#[async_trait]
impl TagRepository for TagRepositoryImpl {
    async fn create(&self, tag: &Tag) -> Result<Tag> {
        sqlx::query(
            r#"
            INSERT INTO tags (id, organization_id, `key`, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&tag.id)
        .bind(&tag.organization_id)
        .bind(&tag.key)
        .bind(&tag.name)
        .bind(&tag.description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&tag.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create tag")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn find_by_key(&self, organization_id: &UuidStr, key: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags WHERE organization_id = ? AND `key` = ?",
            COLUMNS
        ))
        .bind(organization_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn list_by_organization(
        &self,
        organization_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags WHERE organization_id = ? ORDER BY `key` ASC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn count_by_organization(&self, organization_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags WHERE organization_id = ?")
            .bind(organization_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateTagInput) -> Result<Tag> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());

        sqlx::query(
            r#"
            UPDATE tags
            SET name = ?, description = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update tag")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_organization(&self, organization_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tags WHERE organization_id = ?")
            .bind(organization_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
