//! User repository

use crate::error::{AppError, Result};
use crate::model::{Reference, UpdateUserInput, User, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a fully-built user. The service layer hashes the initial
    /// password before calling this.
    async fn create(&self, user: &User) -> Result<User>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<User>>;
    async fn find_by_username(&self, reference: &Reference, username: &str)
        -> Result<Option<User>>;
    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>>;
    async fn count_by_reference(&self, reference: &Reference) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateUserInput) -> Result<User>;
    async fn update_password_hash(&self, id: &UuidStr, password_hash: &str) -> Result<()>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64>;
}

pub struct UserRepositoryImpl {
    pool: MySqlPool,
}

impl UserRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, reference_type, reference_id, username, email, first_name, last_name, \
     password_hash, enabled, account_locked, logins_count, last_login_at, created_at, updated_at";

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, user: &User) -> Result<User> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, reference_type, reference_id, username, email, first_name, last_name,
                 password_hash, enabled, account_locked, logins_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, NOW(), NOW())
            "#,
        )
        .bind(&user.id)
        .bind(user.reference_type)
        .bind(&user.reference_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.enabled)
        .bind(user.account_locked)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&user.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create user")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(
        &self,
        reference: &Reference,
        username: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE reference_type = ? AND reference_id = ? AND username = ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE reference_type = ? AND reference_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_by_reference(&self, reference: &Reference) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE reference_type = ? AND reference_id = ?",
        )
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateUserInput) -> Result<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let email = input.email.as_ref().or(existing.email.as_ref());
        let first_name = input.first_name.as_ref().or(existing.first_name.as_ref());
        let last_name = input.last_name.as_ref().or(existing.last_name.as_ref());
        let enabled = input.enabled.unwrap_or(existing.enabled);
        let account_locked = input.account_locked.unwrap_or(existing.account_locked);

        sqlx::query(
            r#"
            UPDATE users
            SET email = ?, first_name = ?, last_name = ?, enabled = ?, account_locked = ?,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(enabled)
        .bind(account_locked)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update user")))
    }

    async fn update_password_hash(&self, id: &UuidStr, password_hash: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = NOW() WHERE id = ?")
                .bind(password_hash)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM users WHERE reference_type = ? AND reference_id = ?")
                .bind(reference.reference_type)
                .bind(&reference.reference_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
