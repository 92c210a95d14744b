//! Shared model types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// UUID stored as CHAR(36) in MySQL.
/// sqlx's uuid feature expects BINARY(16); the schema uses readable text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UuidStr(pub Uuid);

impl UuidStr {
    pub fn new_v4() -> Self {
        UuidStr(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        UuidStr(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl From<Uuid> for UuidStr {
    fn from(uuid: Uuid) -> Self {
        UuidStr(uuid)
    }
}

impl From<UuidStr> for Uuid {
    fn from(id: UuidStr) -> Self {
        id.0
    }
}

impl std::ops::Deref for UuidStr {
    type Target = Uuid;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for UuidStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for UuidStr {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(UuidStr(Uuid::parse_str(s)?))
    }
}

impl sqlx::Type<sqlx::MySql> for UuidStr {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for UuidStr {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        Ok(UuidStr(Uuid::parse_str(&s)?))
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for UuidStr {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.0.to_string(), buf)
    }
}

/// The kind of container an entity is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferenceType {
    Organization,
    Domain,
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceType::Organization => write!(f, "ORGANIZATION"),
            ReferenceType::Domain => write!(f, "DOMAIN"),
        }
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ORGANIZATION" => Ok(ReferenceType::Organization),
            "DOMAIN" => Ok(ReferenceType::Domain),
            _ => Err(format!("Unknown reference type: {}", s)),
        }
    }
}

impl sqlx::Type<sqlx::MySql> for ReferenceType {
    fn type_info() -> sqlx::mysql::MySqlTypeInfo {
        <String as sqlx::Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::MySql>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::MySql> for ReferenceType {
    fn decode(value: sqlx::mysql::MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::MySql>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl<'q> sqlx::Encode<'q, sqlx::MySql> for ReferenceType {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<u8>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        <String as sqlx::Encode<sqlx::MySql>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// The container an entity is attached to: an organization or a security domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub reference_type: ReferenceType,
    pub reference_id: UuidStr,
}

impl Reference {
    pub fn organization(id: UuidStr) -> Self {
        Self {
            reference_type: ReferenceType::Organization,
            reference_id: id,
        }
    }

    pub fn domain(id: UuidStr) -> Self {
        Self {
            reference_type: ReferenceType::Domain,
            reference_id: id,
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.reference_type, self.reference_id)
    }
}

// HRID format: lowercase alphanumeric segments joined by single hyphens
lazy_static::lazy_static! {
    pub static ref HRID_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Validate a human-readable id (URL path fragment)
pub fn validate_hrid(hrid: &str) -> Result<(), validator::ValidationError> {
    if HRID_REGEX.is_match(hrid) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_hrid"))
    }
}

/// Validate a list of human-readable ids
pub fn validate_hrids(hrids: &Vec<String>) -> Result<(), validator::ValidationError> {
    for hrid in hrids {
        validate_hrid(hrid)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_str_roundtrip() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let id: UuidStr = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_uuid_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<UuidStr>().is_err());
    }

    #[test]
    fn test_uuid_str_serde_transparent() {
        let id = UuidStr::new_v4();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn test_reference_type_parse() {
        assert_eq!(
            "domain".parse::<ReferenceType>().unwrap(),
            ReferenceType::Domain
        );
        assert_eq!(
            "ORGANIZATION".parse::<ReferenceType>().unwrap(),
            ReferenceType::Organization
        );
        assert!("realm".parse::<ReferenceType>().is_err());
    }

    #[test]
    fn test_reference_constructors() {
        let id = UuidStr::new_v4();
        assert_eq!(
            Reference::domain(id).reference_type,
            ReferenceType::Domain
        );
        assert_eq!(
            Reference::organization(id).reference_type,
            ReferenceType::Organization
        );
    }

    #[test]
    fn test_hrid_regex() {
        assert!(HRID_REGEX.is_match("my-domain"));
        assert!(HRID_REGEX.is_match("domain123"));
        assert!(!HRID_REGEX.is_match("My Domain"));
        assert!(!HRID_REGEX.is_match("domain_name"));
        assert!(!HRID_REGEX.is_match("-leading"));
    }
}
