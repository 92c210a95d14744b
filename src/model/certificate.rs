//! Certificate model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Signing key material attached to a security domain. The thumbprint and
/// expiry are computed from the PEM content at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Certificate {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    /// Plugin identifier, e.g. "pem", "pkcs12"
    pub cert_type: String,
    /// PEM-encoded certificate content
    pub content: String,
    /// Base64 SHA-256 digest of the DER certificate
    pub thumbprint: String,
    pub expires_at: Option<DateTime<Utc>>,
    /// System certificates are created with the domain and cannot be deleted
    pub system: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Certificate {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            cert_type: "pem".to_string(),
            content: String::new(),
            thumbprint: String::new(),
            expires_at: None,
            system: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCertificateInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub cert_type: String,
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCertificateInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_default() {
        let cert = Certificate::default();
        assert_eq!(cert.cert_type, "pem");
        assert!(!cert.system);
    }

    #[test]
    fn test_create_input_requires_content() {
        let input = CreateCertificateInput {
            name: "signing-key".to_string(),
            cert_type: "pem".to_string(),
            content: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
