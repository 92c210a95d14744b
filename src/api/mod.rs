//! REST API shared utilities (response types, pagination, audit helpers)

pub mod application;
pub mod audit;
pub mod authorization_bundle;
pub mod authorization_engine;
pub mod authorization_schema;
pub mod certificate;
pub mod domain;
pub mod entity_store;
pub mod entrypoint;
pub mod flow;
pub mod group;
pub mod health;
pub mod identity_provider;
pub mod membership;
pub mod metrics;
pub mod organization;
pub mod password_policy;
pub mod policy_set;
pub mod role;
pub mod scope;
pub mod tag;
pub mod theme;
pub mod user;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateAuditLogInput, Reference, UuidStr};
use crate::server::AppState;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum allowed per_page value for pagination
pub(crate) const MAX_PER_PAGE: i64 = 100;

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PaginationQuery {
    #[serde(default = "default_page", deserialize_with = "deserialize_page")]
    pub page: i64,
    #[serde(
        default = "default_per_page",
        deserialize_with = "deserialize_per_page",
        alias = "limit"
    )]
    pub per_page: i64,
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_per_page() -> i64 {
    20
}

/// Reject page values less than 1
pub(crate) fn deserialize_page<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    if value < 1 {
        return Err(serde::de::Error::custom(
            "page must be a positive integer (>= 1)",
        ));
    }
    Ok(value)
}

/// Reject per_page values less than 1, clamp to MAX_PER_PAGE
pub(crate) fn deserialize_per_page<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = i64::deserialize(deserializer)?;
    if value < 1 {
        return Err(serde::de::Error::custom(
            "per_page must be a positive integer (>= 1)",
        ));
    }
    Ok(value.min(MAX_PER_PAGE))
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, per_page: i64, total: i64) -> Self {
        let total_pages = (total as f64 / per_page as f64).ceil() as i64;
        Self {
            data,
            pagination: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}

/// Success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Message response (for delete, etc.)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Resolve an organization path parent for a reference-scoped entity.
/// Returns the reference plus the organization id governing policy.
pub(crate) async fn resolve_organization_reference(
    state: &AppState,
    org_id: UuidStr,
) -> Result<(Reference, UuidStr)> {
    let _ = state.organization_service.get(&org_id).await?;
    Ok((Reference::organization(org_id), org_id))
}

/// Resolve a domain path parent for a reference-scoped entity.
pub(crate) async fn resolve_domain_reference(
    state: &AppState,
    domain_id: UuidStr,
) -> Result<(Reference, UuidStr)> {
    let domain = state.domain_service.get(&domain_id).await?;
    Ok((Reference::domain(domain_id), domain.organization_id))
}

/// Record a management event. Best effort; failures are logged, not returned.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn write_audit_log(
    state: &AppState,
    auth: &AuthUser,
    headers: &HeaderMap,
    organization_id: Option<UuidStr>,
    action: &str,
    resource_type: &str,
    resource_id: Option<UuidStr>,
    old_value: Option<serde_json::Value>,
    new_value: Option<serde_json::Value>,
) {
    state
        .audit_service
        .record(CreateAuditLogInput {
            organization_id,
            actor_id: Some(UuidStr::from(auth.user_id)),
            actor_email: Some(auth.email.clone()),
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id,
            old_value,
            new_value,
            ip_address: extract_ip(headers),
        })
        .await;
}

pub(crate) fn extract_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-forwarded-for") {
        if let Ok(forwarded) = value.to_str() {
            if let Some(first) = forwarded.split(',').next() {
                let trimmed = first.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    if let Some(value) = headers.get("x-real-ip") {
        if let Ok(real_ip) = value.to_str() {
            if !real_ip.trim().is_empty() {
                return Some(real_ip.trim().to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_query_defaults() {
        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 20);
    }

    #[test]
    fn test_pagination_query_per_page_clamped_to_max() {
        let query: PaginationQuery =
            serde_json::from_str(r#"{"page": 1, "per_page": 1000000}"#).unwrap();
        assert_eq!(query.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_pagination_query_page_zero_rejected() {
        assert!(serde_json::from_str::<PaginationQuery>(r#"{"page": 0}"#).is_err());
    }

    #[test]
    fn test_pagination_query_limit_alias() {
        let query: PaginationQuery = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(query.per_page, 5);
    }

    #[test]
    fn test_extract_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.2.3, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.9.9.9".parse().unwrap());
        assert_eq!(extract_ip(&headers), Some("10.1.2.3".to_string()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.9.9.9".parse().unwrap());
        assert_eq!(extract_ip(&headers), Some("10.9.9.9".to_string()));
    }

    #[test]
    fn test_paginated_response_total_pages() {
        let resp = PaginatedResponse::new(vec![1, 2, 3], 1, 20, 45);
        assert_eq!(resp.pagination.total_pages, 3);
    }
}
