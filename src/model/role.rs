//! Role model

use super::common::{ReferenceType, UuidStr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Named permission set scoped to an organization or domain
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: UuidStr,
    pub reference_type: ReferenceType,
    pub reference_id: UuidStr,
    pub name: String,
    pub description: Option<String>,
    /// Permission strings, e.g. "application:read"
    #[sqlx(json)]
    pub permissions: Vec<String>,
    /// System roles are seeded and cannot be modified or deleted
    pub system: bool,
    /// Assigned to new members when no explicit role is given
    pub default_role: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Role {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            reference_type: ReferenceType::Domain,
            reference_id: UuidStr::new_v4(),
            name: String::new(),
            description: None,
            permissions: Vec::new(),
            system: false,
            default_role: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Role {
    pub fn reference(&self) -> super::common::Reference {
        super::common::Reference {
            reference_type: self.reference_type,
            reference_id: self.reference_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoleInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRoleInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub default_role: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_default() {
        let role = Role::default();
        assert!(!role.system);
        assert!(!role.default_role);
        assert!(role.permissions.is_empty());
    }
}
