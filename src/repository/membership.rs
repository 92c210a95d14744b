//! Membership repository

use crate::error::{AppError, Result};
use crate::model::{
    CreateMembershipInput, MemberType, Membership, Reference, UpdateMembershipInput, UuidStr,
};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn create(
        &self,
        reference: &Reference,
        input: &CreateMembershipInput,
    ) -> Result<Membership>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Membership>>;
    async fn find_by_member_and_role(
        &self,
        reference: &Reference,
        member_type: MemberType,
        member_id: &UuidStr,
        role_id: &UuidStr,
    ) -> Result<Option<Membership>>;
    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Membership>>;
    async fn count_by_reference(&self, reference: &Reference) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateMembershipInput) -> Result<Membership>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64>;
}

pub struct MembershipRepositoryImpl {
    pool: MySqlPool,
}

impl MembershipRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, reference_type, reference_id, member_type, member_id, role_id, \
     created_at, updated_at";

#[async_trait]
impl MembershipRepository for MembershipRepositoryImpl {
    async fn create(
        &self,
        reference: &Reference,
        input: &CreateMembershipInput,
    ) -> Result<Membership> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO memberships
                (id, reference_type, reference_id, member_type, member_id, role_id,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(input.member_type)
        .bind(&input.member_id)
        .bind(&input.role_id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create membership")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn find_by_member_and_role(
        &self,
        reference: &Reference,
        member_type: MemberType,
        member_id: &UuidStr,
        role_id: &UuidStr,
    ) -> Result<Option<Membership>> {
        let membership = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships WHERE reference_type = ? AND reference_id = ? \
             AND member_type = ? AND member_id = ? AND role_id = ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(member_type)
        .bind(member_id)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(membership)
    }

    async fn list_by_reference(
        &self,
        reference: &Reference,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Membership>> {
        let memberships = sqlx::query_as::<_, Membership>(&format!(
            "SELECT {} FROM memberships WHERE reference_type = ? AND reference_id = ? \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    async fn count_by_reference(&self, reference: &Reference) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM memberships WHERE reference_type = ? AND reference_id = ?",
        )
        .bind(reference.reference_type)
        .bind(&reference.reference_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateMembershipInput) -> Result<Membership> {
        let result = sqlx::query(
            "UPDATE memberships SET role_id = ?, updated_at = NOW() WHERE id = ?",
        )
        .bind(&input.role_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Membership {} not found", id)));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update membership")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Membership {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_reference(&self, reference: &Reference) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM memberships WHERE reference_type = ? AND reference_id = ?")
                .bind(reference.reference_type)
                .bind(&reference.reference_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
