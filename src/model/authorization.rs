//! Authorization-engine configuration models
//!
//! These entities configure an external policy-evaluation sidecar; nothing in
//! this service evaluates policies. PolicySet, EntityStore, and
//! AuthorizationSchema share one versioning convention: every content update
//! inserts an immutable version row and bumps the parent's `latest_version`.
//! Bundles pin one version of each component into a deployable snapshot.

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Policy language understood by the evaluation sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    #[default]
    Cedar,
    Gapl,
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineType::Cedar => write!(f, "cedar"),
            EngineType::Gapl => write!(f, "gapl"),
        }
    }
}

impl std::str::FromStr for EngineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cedar" => Ok(EngineType::Cedar),
            "gapl" => Ok(EngineType::Gapl),
            _ => Err(format!("Unknown engine type: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::MySql> for EngineType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for EngineType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for EngineType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// Connection settings for a domain's evaluation sidecar
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorizationEngine {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub engine_type: EngineType,
    pub endpoint_url: String,
    #[sqlx(json)]
    pub configuration: serde_json::Value,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AuthorizationEngine {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            engine_type: EngineType::Cedar,
            endpoint_url: String::new(),
            configuration: serde_json::json!({}),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthorizationEngineInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub engine_type: EngineType,
    #[validate(url)]
    pub endpoint_url: String,
    pub configuration: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAuthorizationEngineInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(url)]
    pub endpoint_url: Option<String>,
    pub configuration: Option<serde_json::Value>,
    pub enabled: Option<bool>,
}

/// Named policy text with an append-only version history. `latest_version`
/// always matches the highest version row; version 0 means no content yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PolicySet {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub description: Option<String>,
    pub latest_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for PolicySet {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            description: None,
            latest_version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Immutable snapshot of a policy set's content
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PolicySetVersion {
    pub id: UuidStr,
    pub policy_set_id: UuidStr,
    pub version: i64,
    /// Raw Cedar/GAPL policy source
    pub content: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Default for PolicySetVersion {
    fn default() -> Self {
        Self {
            id: UuidStr::new_v4(),
            policy_set_id: UuidStr::new_v4(),
            version: 1,
            content: String::new(),
            created_by: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePolicySetInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    /// Initial content; when present the policy set is created at version 1
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePolicySetInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    /// New content appends a version and bumps `latest_version`
    pub content: Option<String>,
}

/// Entity data consumed by the sidecar, versioned like PolicySet
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntityStore {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub description: Option<String>,
    pub latest_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for EntityStore {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            description: None,
            latest_version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntityStoreVersion {
    pub id: UuidStr,
    pub entity_store_id: UuidStr,
    pub version: i64,
    #[sqlx(json)]
    pub entities: serde_json::Value,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Default for EntityStoreVersion {
    fn default() -> Self {
        Self {
            id: UuidStr::new_v4(),
            entity_store_id: UuidStr::new_v4(),
            version: 1,
            entities: serde_json::json!([]),
            created_by: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEntityStoreInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub entities: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEntityStoreInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub entities: Option<serde_json::Value>,
}

/// Schema describing entity types and actions, versioned like PolicySet
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorizationSchema {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub description: Option<String>,
    pub latest_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AuthorizationSchema {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            description: None,
            latest_version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorizationSchemaVersion {
    pub id: UuidStr,
    pub schema_id: UuidStr,
    pub version: i64,
    #[sqlx(json)]
    pub schema: serde_json::Value,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Default for AuthorizationSchemaVersion {
    fn default() -> Self {
        Self {
            id: UuidStr::new_v4(),
            schema_id: UuidStr::new_v4(),
            version: 1,
            schema: serde_json::json!({}),
            created_by: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthorizationSchemaInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAuthorizationSchemaInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<serde_json::Value>,
}

/// Immutable deployable snapshot: pins one version of a policy set, an entity
/// store, and a schema belonging to the same domain. Bundles are created and
/// deleted, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuthorizationBundle {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub policy_set_id: UuidStr,
    pub policy_set_version: i64,
    pub entity_store_id: UuidStr,
    pub entity_store_version: i64,
    pub schema_id: UuidStr,
    pub schema_version: i64,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Default for AuthorizationBundle {
    fn default() -> Self {
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            policy_set_id: UuidStr::new_v4(),
            policy_set_version: 1,
            entity_store_id: UuidStr::new_v4(),
            entity_store_version: 1,
            schema_id: UuidStr::new_v4(),
            schema_version: 1,
            created_by: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAuthorizationBundleInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub policy_set_id: UuidStr,
    /// Defaults to the policy set's latest version when absent
    pub policy_set_version: Option<i64>,
    pub entity_store_id: UuidStr,
    pub entity_store_version: Option<i64>,
    pub schema_id: UuidStr,
    pub schema_version: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_type_parse() {
        assert_eq!("CEDAR".parse::<EngineType>().unwrap(), EngineType::Cedar);
        assert_eq!("gapl".parse::<EngineType>().unwrap(), EngineType::Gapl);
        assert!("opa".parse::<EngineType>().is_err());
    }

    #[test]
    fn test_new_policy_set_has_no_versions() {
        let set = PolicySet::default();
        assert_eq!(set.latest_version, 0);
    }
}
