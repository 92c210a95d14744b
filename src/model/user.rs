//! End-user account model

use super::common::{ReferenceType, UuidStr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// End-user account scoped to an organization or domain.
///
/// The password hash never leaves the service layer: it is skipped during
/// serialization and absent from update inputs (password changes go through
/// the dedicated reset operation).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UuidStr,
    pub reference_type: ReferenceType,
    pub reference_id: UuidStr,
    /// Unique per reference
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub enabled: bool,
    pub account_locked: bool,
    pub logins_count: i64,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            reference_type: ReferenceType::Domain,
            reference_id: UuidStr::new_v4(),
            username: String::new(),
            email: None,
            first_name: None,
            last_name: None,
            password_hash: None,
            enabled: true,
            account_locked: false,
            logins_count: 0,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl User {
    pub fn reference(&self) -> super::common::Reference {
        super::common::Reference {
            reference_type: self.reference_type,
            reference_id: self.reference_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Initial password, checked against the domain's default password policy
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub enabled: Option<bool>,
    pub account_locked: Option<bool>,
}

/// Body of the reset-password operation
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordInput {
    #[validate(length(min = 1))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            password_hash: Some("argon2-hash".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_create_input_validates_email() {
        let input = CreateUserInput {
            username: "jdoe".to_string(),
            email: Some("not-an-email".to_string()),
            first_name: None,
            last_name: None,
            password: None,
        };
        assert!(input.validate().is_err());
    }
}
