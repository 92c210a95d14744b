//! OAuth2 scope model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// OAuth2 scope definition within a security domain. The key is the value
/// that appears in token requests and is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Scope {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    /// Scope value used on the wire, unique per domain
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    /// Whether the scope is advertised in OIDC discovery
    pub discovery: bool,
    /// Optional consent expiry override in seconds
    pub expires_in: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Scope {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            key: String::new(),
            name: String::new(),
            description: None,
            discovery: false,
            expires_in: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateScopeInput {
    #[validate(length(min = 1, max = 255), custom(function = "super::common::validate_hrid"))]
    pub key: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub discovery: bool,
    #[validate(range(min = 1))]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateScopeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub discovery: Option<bool>,
    #[validate(range(min = 1))]
    pub expires_in: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_key_format() {
        let input = CreateScopeInput {
            key: "Read Mail".to_string(),
            name: "Read mail".to_string(),
            description: None,
            discovery: false,
            expires_in: None,
        };
        assert!(input.validate().is_err());

        let input = CreateScopeInput {
            key: "read-mail".to_string(),
            name: "Read mail".to_string(),
            description: None,
            discovery: true,
            expires_in: Some(3600),
        };
        assert!(input.validate().is_ok());
    }
}
