//! Role repository

use crate::error::{AppError, Result};
use crate::model::{CreateRoleInput, Reference, Role, UpdateRoleInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, reference: &Reference, input: &CreateRoleInput) -> Result<Role>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Role>>;
    async fn find_by_name(&self, reference: &Reference, name: &str) -> Result<Option<Role>>;
    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Role>>;
    async fn count_by_reference(&self, reference: &Reference) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateRoleInput) -> Result<Role>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64>;
}

pub struct RoleRepositoryImpl {
    pool: MySqlPool,
}

impl RoleRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, reference_type, reference_id, name, description, permissions, \
     `system`, default_role, created_at, updated_at";

#[async_trait]
impl RoleRepository for RoleRepositoryImpl {
    async fn create(&self, reference: &Reference, input: &CreateRoleInput) -> Result<Role> {
        let id = UuidStr::new_v4();
        let permissions = input.permissions.clone().unwrap_or_default();
        let permissions_json =
            serde_json::to_string(&permissions).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO roles
                (id, reference_type, reference_id, name, description, permissions,
                 `system`, default_role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, FALSE, FALSE, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&permissions_json)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create role")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn find_by_name(&self, reference: &Reference, name: &str) -> Result<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE reference_type = ? AND reference_id = ? AND name = ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role)
    }

    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Role>> {
        let roles = sqlx::query_as::<_, Role>(&format!(
            "SELECT {} FROM roles WHERE reference_type = ? AND reference_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    async fn count_by_reference(&self, reference: &Reference) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM roles WHERE reference_type = ? AND reference_id = ?",
        )
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateRoleInput) -> Result<Role> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let description = input.description.as_ref().or(existing.description.as_ref());
        let permissions = input.permissions.as_ref().unwrap_or(&existing.permissions);
        let default_role = input.default_role.unwrap_or(existing.default_role);
        let permissions_json =
            serde_json::to_string(permissions).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE roles
            SET name = ?, description = ?, permissions = ?, default_role = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(&permissions_json)
        .bind(default_role)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update role")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Role {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM roles WHERE reference_type = ? AND reference_id = ?")
                .bind(reference.reference_type)
                .bind(&reference.reference_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
