//! Group model

use super::common::{ReferenceType, UuidStr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// User collection scoped to an organization or domain
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: UuidStr,
    pub reference_type: ReferenceType,
    pub reference_id: UuidStr,
    pub name: String,
    pub description: Option<String>,
    /// Ids of member users
    #[sqlx(json)]
    pub members: Vec<UuidStr>,
    /// Roles granted to every member
    #[sqlx(json)]
    pub roles: Vec<UuidStr>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Group {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            reference_type: ReferenceType::Domain,
            reference_id: UuidStr::new_v4(),
            name: String::new(),
            description: None,
            members: Vec::new(),
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Group {
    pub fn reference(&self) -> super::common::Reference {
        super::common::Reference {
            reference_type: self.reference_type,
            reference_id: self.reference_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub members: Option<Vec<UuidStr>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGroupInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub members: Option<Vec<UuidStr>>,
    pub roles: Option<Vec<UuidStr>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_default() {
        let group = Group::default();
        assert!(group.members.is_empty());
        assert!(group.roles.is_empty());
    }
}
