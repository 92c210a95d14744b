//! Password policy repository

use crate::error::{AppError, Result};
use crate::model::{
    CreatePasswordPolicyInput, PasswordPolicy, UpdatePasswordPolicyInput, UuidStr,
};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordPolicyRepository: Send + Sync {
    async fn create(
        &self,
        domain_id: &UuidStr,
        input: &CreatePasswordPolicyInput,
    ) -> Result<PasswordPolicy>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<PasswordPolicy>>;
    async fn find_default_by_domain(&self, domain_id: &UuidStr) -> Result<Option<PasswordPolicy>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PasswordPolicy>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update(
        &self,
        id: &UuidStr,
        input: &UpdatePasswordPolicyInput,
    ) -> Result<PasswordPolicy>;
    /// Mark one policy as the domain default and clear the flag on all others.
    async fn set_default(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<PasswordPolicy>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct PasswordPolicyRepositoryImpl {
    pool: MySqlPool,
}

impl PasswordPolicyRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, name, min_length, max_length, include_numbers, \
     include_special_characters, letters_in_mixed_case, max_consecutive_letters, \
     default_policy, created_at, updated_at";

#[async_trait]
impl PasswordPolicyRepository for PasswordPolicyRepositoryImpl {
    async fn create(
        &self,
        domain_id: &UuidStr,
        input: &CreatePasswordPolicyInput,
    ) -> Result<PasswordPolicy> {
        let id = UuidStr::new_v4();
        let defaults = PasswordPolicy::default();

        sqlx::query(
            r#"
            INSERT INTO password_policies
                (id, domain_id, name, min_length, max_length, include_numbers,
                 include_special_characters, letters_in_mixed_case, max_consecutive_letters,
                 default_policy, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, FALSE, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(&input.name)
        .bind(input.min_length.unwrap_or(defaults.min_length))
        .bind(input.max_length.unwrap_or(defaults.max_length))
        .bind(input.include_numbers.unwrap_or(defaults.include_numbers))
        .bind(
            input
                .include_special_characters
                .unwrap_or(defaults.include_special_characters),
        )
        .bind(
            input
                .letters_in_mixed_case
                .unwrap_or(defaults.letters_in_mixed_case),
        )
        .bind(
            input
                .max_consecutive_letters
                .unwrap_or(defaults.max_consecutive_letters),
        )
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create password policy")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<PasswordPolicy>> {
        let policy = sqlx::query_as::<_, PasswordPolicy>(&format!(
            "SELECT {} FROM password_policies WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(policy)
    }

    async fn find_default_by_domain(&self, domain_id: &UuidStr) -> Result<Option<PasswordPolicy>> {
        let policy = sqlx::query_as::<_, PasswordPolicy>(&format!(
            "SELECT {} FROM password_policies WHERE domain_id = ? AND default_policy = TRUE",
            COLUMNS
        ))
        .bind(domain_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(policy)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PasswordPolicy>> {
        let policies = sqlx::query_as::<_, PasswordPolicy>(&format!(
            "SELECT {} FROM password_policies WHERE domain_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(policies)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM password_policies WHERE domain_id = ?")
                .bind(domain_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn update(
        &self,
        id: &UuidStr,
        input: &UpdatePasswordPolicyInput,
    ) -> Result<PasswordPolicy> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Password policy {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let min_length = input.min_length.unwrap_or(existing.min_length);
        let max_length = input.max_length.unwrap_or(existing.max_length);
        let include_numbers = input.include_numbers.unwrap_or(existing.include_numbers);
        let include_special_characters = input
            .include_special_characters
            .unwrap_or(existing.include_special_characters);
        let letters_in_mixed_case = input
            .letters_in_mixed_case
            .unwrap_or(existing.letters_in_mixed_case);
        let max_consecutive_letters = input
            .max_consecutive_letters
            .unwrap_or(existing.max_consecutive_letters);

        sqlx::query(
            r#"
            UPDATE password_policies
            SET name = ?, min_length = ?, max_length = ?, include_numbers = ?,
                include_special_characters = ?, letters_in_mixed_case = ?,
                max_consecutive_letters = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(min_length)
        .bind(max_length)
        .bind(include_numbers)
        .bind(include_special_characters)
        .bind(letters_in_mixed_case)
        .bind(max_consecutive_letters)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update password policy")))
    }

    async fn set_default(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<PasswordPolicy> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE password_policies SET default_policy = FALSE, updated_at = NOW() \
             WHERE domain_id = ? AND default_policy = TRUE",
        )
        .bind(domain_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE password_policies SET default_policy = TRUE, updated_at = NOW() \
             WHERE id = ? AND domain_id = ?",
        )
        .bind(id)
        .bind(domain_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!(
                "Password policy {} not found",
                id
            )));
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set default policy")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM password_policies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Password policy {} not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM password_policies WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
