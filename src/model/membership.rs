//! Membership model

use super::common::{ReferenceType, UuidStr};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Whether a membership binds a user or a group to the role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberType {
    #[default]
    User,
    Group,
}

impl std::fmt::Display for MemberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberType::User => write!(f, "USER"),
            MemberType::Group => write!(f, "GROUP"),
        }
    }
}

impl std::str::FromStr for MemberType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(MemberType::User),
            "GROUP" => Ok(MemberType::Group),
            _ => Err(format!("Unknown member type: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::MySql> for MemberType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for MemberType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for MemberType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// Grants a role to a user or group within an organization or domain. A given
/// member holds at most one membership per role per reference.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Membership {
    pub id: UuidStr,
    pub reference_type: ReferenceType,
    pub reference_id: UuidStr,
    pub member_type: MemberType,
    pub member_id: UuidStr,
    pub role_id: UuidStr,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Membership {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            reference_type: ReferenceType::Domain,
            reference_id: UuidStr::new_v4(),
            member_type: MemberType::User,
            member_id: UuidStr::new_v4(),
            role_id: UuidStr::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Membership {
    pub fn reference(&self) -> super::common::Reference {
        super::common::Reference {
            reference_type: self.reference_type,
            reference_id: self.reference_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMembershipInput {
    #[serde(default)]
    pub member_type: MemberType,
    pub member_id: UuidStr,
    pub role_id: UuidStr,
}

/// Memberships are replaced, not patched: updating only moves the member to
/// another role.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMembershipInput {
    pub role_id: UuidStr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_type_parse() {
        assert_eq!("group".parse::<MemberType>().unwrap(), MemberType::Group);
        assert!("team".parse::<MemberType>().is_err());
    }
}
