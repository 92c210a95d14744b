//! Security domain model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A tenant's isolated security realm: its own users, applications, identity
/// providers, and authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Domain {
    pub id: UuidStr,
    pub organization_id: UuidStr,
    pub name: String,
    /// URL path fragment, unique within the organization
    pub hrid: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Domain {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            organization_id: UuidStr::new_v4(),
            name: String::new(),
            hrid: String::new(),
            description: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDomainInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 63), custom(function = "super::common::validate_hrid"))]
    pub hrid: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDomainInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_default_enabled() {
        assert!(Domain::default().enabled);
    }

    #[test]
    fn test_create_input_validates_hrid() {
        let input = CreateDomainInput {
            name: "Consumer".to_string(),
            hrid: "Consumer Realm".to_string(),
            description: None,
        };
        assert!(input.validate().is_err());

        let input = CreateDomainInput {
            name: "Consumer".to_string(),
            hrid: "consumer-realm".to_string(),
            description: None,
        };
        assert!(input.validate().is_ok());
    }
}
