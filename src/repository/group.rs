//! Group repository
//!
//! Backed by the `user_groups` table (`groups` is reserved in MySQL 8).

use crate::error::{AppError, Result};
use crate::model::{CreateGroupInput, Group, Reference, UpdateGroupInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, reference: &Reference, input: &CreateGroupInput) -> Result<Group>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Group>>;
    async fn find_by_name(&self, reference: &Reference, name: &str) -> Result<Option<Group>>;
    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Group>>;
    async fn count_by_reference(&self, reference: &Reference) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateGroupInput) -> Result<Group>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64>;
}

pub struct GroupRepositoryImpl {
    pool: MySqlPool,
}

impl GroupRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, reference_type, reference_id, name, description, members, roles, created_at, updated_at";

#[async_trait]
impl GroupRepository for GroupRepositoryImpl {
    async fn create(&self, reference: &Reference, input: &CreateGroupInput) -> Result<Group> {
        let id = UuidStr::new_v4();
        let members = input.members.clone().unwrap_or_default();
        let members_json =
            serde_json::to_string(&members).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO user_groups
                (id, reference_type, reference_id, name, description, members, roles,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, '[]', NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&members_json)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create group")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {} FROM user_groups WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn find_by_name(&self, reference: &Reference, name: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(&format!(
            "SELECT {} FROM user_groups WHERE reference_type = ? AND reference_id = ? AND name = ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(&format!(
            "SELECT {} FROM user_groups WHERE reference_type = ? AND reference_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn count_by_reference(&self, reference: &Reference) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM user_groups WHERE reference_type = ? AND reference_id = ?",
        )
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateGroupInput) -> Result<Group> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let members = input.members.as_ref().unwrap_or(&existing.members);
        let roles = input.roles.as_ref().unwrap_or(&existing.roles);
        let members_json =
            serde_json::to_string(members).map_err(|e| AppError::Internal(e.into()))?;
        let roles_json = serde_json::to_string(roles).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE user_groups
            SET name = ?, description = ?, members = ?, roles = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(&members_json)
        .bind(&roles_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update group")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM user_groups WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Group {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM user_groups WHERE reference_type = ? AND reference_id = ?")
                .bind(reference.reference_type)
                .bind(&reference.reference_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
