//! Flow model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Lifecycle point a flow hooks into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    #[default]
    Root,
    Login,
    Registration,
    ResetPassword,
}

impl std::fmt::Display for FlowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowType::Root => write!(f, "ROOT"),
            FlowType::Login => write!(f, "LOGIN"),
            FlowType::Registration => write!(f, "REGISTRATION"),
            FlowType::ResetPassword => write!(f, "RESET_PASSWORD"),
        }
    }
}

impl std::str::FromStr for FlowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ROOT" => Ok(FlowType::Root),
            "LOGIN" => Ok(FlowType::Login),
            "REGISTRATION" => Ok(FlowType::Registration),
            "RESET_PASSWORD" => Ok(FlowType::ResetPassword),
            _ => Err(format!("Unknown flow type: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::MySql> for FlowType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for FlowType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for FlowType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// Ordered pre/post step configuration attached to a domain lifecycle point.
/// Steps are opaque JSON executed by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Flow {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub flow_type: FlowType,
    pub name: String,
    #[sqlx(json)]
    pub pre_steps: serde_json::Value,
    #[sqlx(json)]
    pub post_steps: serde_json::Value,
    pub enabled: bool,
    /// Evaluation position among flows of the same type
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Flow {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            flow_type: FlowType::default(),
            name: String::new(),
            pre_steps: serde_json::json!([]),
            post_steps: serde_json::json!([]),
            enabled: true,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFlowInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub flow_type: FlowType,
    pub pre_steps: Option<serde_json::Value>,
    pub post_steps: Option<serde_json::Value>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateFlowInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub pre_steps: Option<serde_json::Value>,
    pub post_steps: Option<serde_json::Value>,
    pub enabled: Option<bool>,
    pub position: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_type_parse() {
        assert_eq!(
            "reset_password".parse::<FlowType>().unwrap(),
            FlowType::ResetPassword
        );
        assert!("logout".parse::<FlowType>().is_err());
    }

    #[test]
    fn test_flow_default_steps_empty() {
        let flow = Flow::default();
        assert_eq!(flow.pre_steps, serde_json::json!([]));
        assert_eq!(flow.post_steps, serde_json::json!([]));
    }
}
