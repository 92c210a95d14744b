//! Audit log repository

use crate::error::Result;
use crate::model::{AuditLog, AuditLogQuery, CreateAuditLogInput};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create(&self, input: &CreateAuditLogInput) -> Result<()>;
    async fn find(&self, query: &AuditLogQuery) -> Result<Vec<AuditLog>>;
    async fn count(&self, query: &AuditLogQuery) -> Result<i64>;
}

pub struct AuditRepositoryImpl {
    pool: MySqlPool,
}

impl AuditRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, organization_id, actor_id, actor_email, action, resource_type, \
     resource_id, old_value, new_value, ip_address, created_at";

fn filter_clauses(query: &AuditLogQuery, sql: &mut String) {
    if query.organization_id.is_some() {
        sql.push_str(" AND organization_id = ?");
    }
    if query.actor_id.is_some() {
        sql.push_str(" AND actor_id = ?");
    }
    if query.resource_type.is_some() {
        sql.push_str(" AND resource_type = ?");
    }
    if query.resource_id.is_some() {
        sql.push_str(" AND resource_id = ?");
    }
    if query.action.is_some() {
        sql.push_str(" AND action = ?");
    }
    if query.from_date.is_some() {
        sql.push_str(" AND created_at >= ?");
    }
    if query.to_date.is_some() {
        sql.push_str(" AND created_at <= ?");
    }
}

macro_rules! bind_filters {
    ($builder:expr, $query:expr) => {{
        let mut builder = $builder;
        if let Some(ref organization_id) = $query.organization_id {
            builder = builder.bind(organization_id);
        }
        if let Some(ref actor_id) = $query.actor_id {
            builder = builder.bind(actor_id);
        }
        if let Some(ref resource_type) = $query.resource_type {
            builder = builder.bind(resource_type);
        }
        if let Some(ref resource_id) = $query.resource_id {
            builder = builder.bind(resource_id);
        }
        if let Some(ref action) = $query.action {
            builder = builder.bind(action);
        }
        if let Some(from_date) = $query.from_date {
            builder = builder.bind(from_date);
        }
        if let Some(to_date) = $query.to_date {
            builder = builder.bind(to_date);
        }
        builder
    }};
}

#[async_trait]
impl AuditRepository for AuditRepositoryImpl {
    async fn create(&self, input: &CreateAuditLogInput) -> Result<()> {
        let old_value = input
            .old_value
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());
        let new_value = input
            .new_value
            .as_ref()
            .map(|v| serde_json::to_string(v).unwrap_or_default());

        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (organization_id, actor_id, actor_email, action, resource_type, resource_id,
                 old_value, new_value, ip_address, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(&input.organization_id)
        .bind(&input.actor_id)
        .bind(&input.actor_email)
        .bind(&input.action)
        .bind(&input.resource_type)
        .bind(&input.resource_id)
        .bind(old_value)
        .bind(new_value)
        .bind(&input.ip_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, query: &AuditLogQuery) -> Result<Vec<AuditLog>> {
        let mut sql = format!("SELECT {} FROM audit_logs WHERE 1=1", COLUMNS);
        filter_clauses(query, &mut sql);
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let builder = bind_filters!(sqlx::query_as::<_, AuditLog>(&sql), query);
        let logs = builder
            .bind(query.limit.unwrap_or(50))
            .bind(query.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(logs)
    }

    async fn count(&self, query: &AuditLogQuery) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) FROM audit_logs WHERE 1=1");
        filter_clauses(query, &mut sql);

        let builder = bind_filters!(sqlx::query_as::<_, (i64,)>(&sql), query);
        let row = builder.fetch_one(&self.pool).await?;

        Ok(row.0)
    }
}
