//! Sharding tag model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Organization-level sharding tag. Entrypoints reference tags by key to pin
/// domains to gateway shards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: UuidStr,
    pub organization_id: UuidStr,
    /// Hrid-style key derived from the name at creation, unique per organization
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Tag {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            organization_id: UuidStr::new_v4(),
            key: String::new(),
            name: String::new(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTagInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTagInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Derive a URL-safe key from a display name
pub fn slugify_tag_name(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            key.push('-');
            last_dash = true;
        }
    }
    while key.ends_with('-') {
        key.pop();
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_tag_name() {
        assert_eq!(slugify_tag_name("EU West"), "eu-west");
        assert_eq!(slugify_tag_name("  Prod / Primary  "), "prod-primary");
        assert_eq!(slugify_tag_name("simple"), "simple");
    }
}
