//! Entrypoint model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Gateway URL binding owned by an organization. Tags restrict which sharded
/// gateway instances serve the entrypoint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entrypoint {
    pub id: UuidStr,
    pub organization_id: UuidStr,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    /// Default entrypoints cannot be deleted
    pub default_entrypoint: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Entrypoint {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            organization_id: UuidStr::new_v4(),
            name: String::new(),
            url: String::new(),
            description: None,
            tags: Vec::new(),
            default_entrypoint: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEntrypointInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEntrypointInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_rejects_bad_url() {
        let input = CreateEntrypointInput {
            name: "Gateway".to_string(),
            url: "not a url".to_string(),
            description: None,
            tags: None,
        };
        assert!(input.validate().is_err());
    }
}
