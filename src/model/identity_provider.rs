//! Identity provider model

use super::common::{Reference, ReferenceType, UuidStr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Authentication source attached to an organization or a security domain.
/// Configuration is provider-specific JSON interpreted by the gateway, never
/// by the management plane.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdentityProvider {
    pub id: UuidStr,
    pub reference_type: ReferenceType,
    pub reference_id: UuidStr,
    pub name: String,
    /// Plugin identifier, e.g. "ldap", "oidc", "inline"
    pub provider_type: String,
    #[sqlx(json)]
    pub configuration: serde_json::Value,
    /// Attribute mappers applied to incoming profiles
    #[sqlx(json)]
    pub mappers: serde_json::Value,
    /// Whether users authenticate against an external system
    pub external: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentityProvider {
    pub fn reference(&self) -> Reference {
        Reference {
            reference_type: self.reference_type,
            reference_id: self.reference_id,
        }
    }
}

impl Default for IdentityProvider {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            reference_type: ReferenceType::Domain,
            reference_id: UuidStr::new_v4(),
            name: String::new(),
            provider_type: String::new(),
            configuration: serde_json::json!({}),
            mappers: serde_json::json!({}),
            external: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIdentityProviderInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub provider_type: String,
    pub configuration: Option<serde_json::Value>,
    pub mappers: Option<serde_json::Value>,
    #[serde(default)]
    pub external: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateIdentityProviderInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub configuration: Option<serde_json::Value>,
    pub mappers: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_accessor() {
        let idp = IdentityProvider::default();
        let reference = idp.reference();
        assert_eq!(reference.reference_type, ReferenceType::Domain);
        assert_eq!(reference.reference_id, idp.reference_id);
    }

    #[test]
    fn test_create_input_requires_provider_type() {
        let input = CreateIdentityProviderInput {
            name: "Corporate LDAP".to_string(),
            provider_type: String::new(),
            configuration: None,
            mappers: None,
            external: true,
        };
        assert!(input.validate().is_err());
    }
}
