//! Domain branding theme model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Branding applied to a domain's hosted pages. At most one theme exists per
/// domain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Theme {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,
    pub primary_button_color: Option<String>,
    pub secondary_button_color: Option<String>,
    pub primary_text_color: Option<String>,
    pub css: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Theme {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            logo_url: None,
            favicon_url: None,
            primary_button_color: None,
            secondary_button_color: None,
            primary_text_color: None,
            css: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateThemeInput {
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub favicon_url: Option<String>,
    pub primary_button_color: Option<String>,
    pub secondary_button_color: Option<String>,
    pub primary_text_color: Option<String>,
    pub css: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateThemeInput {
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub favicon_url: Option<String>,
    pub primary_button_color: Option<String>,
    pub secondary_button_color: Option<String>,
    pub primary_text_color: Option<String>,
    pub css: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_validates_logo_url() {
        let input = CreateThemeInput {
            logo_url: Some("not a url".to_string()),
            favicon_url: None,
            primary_button_color: None,
            secondary_button_color: None,
            primary_text_color: None,
            css: None,
        };
        assert!(input.validate().is_err());
    }
}
