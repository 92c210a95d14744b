//! Flow repository

use crate::error::{AppError, Result};
use crate::model::{CreateFlowInput, Flow, UpdateFlowInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlowRepository: Send + Sync {
    async fn create(&self, domain_id: &UuidStr, input: &CreateFlowInput) -> Result<Flow>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Flow>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Flow>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, input: &UpdateFlowInput) -> Result<Flow>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct FlowRepositoryImpl {
    pool: MySqlPool,
}

impl FlowRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, flow_type, name, pre_steps, post_steps, enabled, \
     position, created_at, updated_at";

#[async_trait]
impl FlowRepository for FlowRepositoryImpl {
    async fn create(&self, domain_id: &UuidStr, input: &CreateFlowInput) -> Result<Flow> {
        let id = UuidStr::new_v4();
        let pre_steps = input.pre_steps.clone().unwrap_or_else(|| serde_json::json!([]));
        let post_steps = input
            .post_steps
            .clone()
            .unwrap_or_else(|| serde_json::json!([]));
        let pre_steps_json =
            serde_json::to_string(&pre_steps).map_err(|e| AppError::Internal(e.into()))?;
        let post_steps_json =
            serde_json::to_string(&post_steps).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO flows
                (id, domain_id, flow_type, name, pre_steps, post_steps, enabled, position,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, TRUE, ?, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(input.flow_type)
        .bind(&input.name)
        .bind(&pre_steps_json)
        .bind(&post_steps_json)
        .bind(input.position)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create flow")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Flow>> {
        let flow = sqlx::query_as::<_, Flow>(&format!(
            "SELECT {} FROM flows WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(flow)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Flow>> {
        let flows = sqlx::query_as::<_, Flow>(&format!(
            "SELECT {} FROM flows WHERE domain_id = ? ORDER BY position ASC, created_at ASC \
             LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(flows)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM flows WHERE domain_id = ?")
            .bind(domain_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateFlowInput) -> Result<Flow> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flow {} not found", id)))?;

        let name = input.name.as_ref().unwrap_or(&existing.name);
        let pre_steps = input.pre_steps.as_ref().unwrap_or(&existing.pre_steps);
        let post_steps = input.post_steps.as_ref().unwrap_or(&existing.post_steps);
        let enabled = input.enabled.unwrap_or(existing.enabled);
        let position = input.position.unwrap_or(existing.position);
        let pre_steps_json =
            serde_json::to_string(pre_steps).map_err(|e| AppError::Internal(e.into()))?;
        let post_steps_json =
            serde_json::to_string(post_steps).map_err(|e| AppError::Internal(e.into()))?;

        sqlx::query(
            r#"
            UPDATE flows
            SET name = ?, pre_steps = ?, post_steps = ?, enabled = ?, position = ?,
                updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(&pre_steps_json)
        .bind(&post_steps_json)
        .bind(enabled)
        .bind(position)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update flow")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM flows WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Flow {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM flows WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
