//! Application (OAuth2/OIDC client) model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// How the client authenticates and which flows it is allowed to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationType {
    #[default]
    Web,
    Native,
    Browser,
    Service,
}

impl std::fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationType::Web => write!(f, "web"),
            ApplicationType::Native => write!(f, "native"),
            ApplicationType::Browser => write!(f, "browser"),
            ApplicationType::Service => write!(f, "service"),
        }
    }
}

impl std::str::FromStr for ApplicationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(ApplicationType::Web),
            "native" => Ok(ApplicationType::Native),
            "browser" => Ok(ApplicationType::Browser),
            "service" => Ok(ApplicationType::Service),
            _ => Err(format!("Unknown application type: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::MySql> for ApplicationType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for ApplicationType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for ApplicationType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// OAuth2/OIDC client registered within a security domain
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub app_type: ApplicationType,
    pub description: Option<String>,
    pub client_id: String,
    /// Confidential client secret; omitted from list responses by handlers
    pub client_secret: String,
    #[sqlx(json)]
    pub redirect_uris: Vec<String>,
    #[sqlx(json)]
    pub grant_types: Vec<String>,
    /// Marks a built-in template application that cannot be deleted
    pub template: bool,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Application {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            app_type: ApplicationType::default(),
            description: None,
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uris: Vec::new(),
            grant_types: vec!["authorization_code".to_string()],
            template: false,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApplicationInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub app_type: ApplicationType,
    pub description: Option<String>,
    /// Optional caller-supplied client id; generated when absent
    #[validate(length(min = 1, max = 255))]
    pub client_id: Option<String>,
    pub redirect_uris: Option<Vec<String>>,
    pub grant_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateApplicationInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub redirect_uris: Option<Vec<String>>,
    pub grant_types: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_type_parse() {
        assert_eq!(
            "service".parse::<ApplicationType>().unwrap(),
            ApplicationType::Service
        );
        assert!("spa".parse::<ApplicationType>().is_err());
    }

    #[test]
    fn test_application_default_grant_types() {
        let app = Application::default();
        assert_eq!(app.grant_types, vec!["authorization_code"]);
        assert!(app.enabled);
        assert!(!app.template);
    }
}
