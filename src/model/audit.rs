//! Management audit trail model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One management event. Rows are append-only and auto-incremented so ordering
/// survives clock skew between instances.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
    pub id: i64,
    pub organization_id: Option<UuidStr>,
    pub actor_id: Option<UuidStr>,
    pub actor_email: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<UuidStr>,
    #[sqlx(json)]
    pub old_value: Option<serde_json::Value>,
    #[sqlx(json)]
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording an audit log entry
#[derive(Debug, Clone, Default)]
pub struct CreateAuditLogInput {
    pub organization_id: Option<UuidStr>,
    pub actor_id: Option<UuidStr>,
    pub actor_email: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<UuidStr>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

/// Filters for listing audit logs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub organization_id: Option<UuidStr>,
    pub actor_id: Option<UuidStr>,
    pub resource_type: Option<String>,
    pub resource_id: Option<UuidStr>,
    pub action: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub offset: Option<i64>,
    #[serde(skip)]
    pub limit: Option<i64>,
}
