//! Organization model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Top-level tenant container. Every security domain belongs to exactly one
/// organization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Organization {
    pub id: UuidStr,
    pub name: String,
    pub description: Option<String>,
    /// Human-readable ids usable in URLs, most recent last
    #[sqlx(json)]
    pub hrids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Organization {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            name: String::new(),
            description: None,
            hrids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganizationInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "super::common::validate_hrids"))]
    pub hrids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrganizationInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "super::common::validate_hrids"))]
    pub hrids: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_default() {
        let org = Organization::default();
        assert!(!org.id.is_nil());
        assert!(org.hrids.is_empty());
    }

    #[test]
    fn test_create_input_rejects_empty_name() {
        let input = CreateOrganizationInput {
            name: String::new(),
            description: None,
            hrids: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_input_rejects_bad_hrid() {
        let input = CreateOrganizationInput {
            name: "Acme".to_string(),
            description: None,
            hrids: Some(vec!["Not Valid".to_string()]),
        };
        assert!(input.validate().is_err());
    }
}
