//! Management token issuance and verification

use crate::config::JwtConfig;
use crate::error::Result;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a management-plane access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementClaims {
    /// Subject: administrator user id
    pub sub: String,
    pub email: String,
    /// Organization scope; absent for platform-level tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a management token for an administrator
    pub fn issue_token(
        &self,
        user_id: Uuid,
        email: &str,
        org: Option<Uuid>,
        roles: Vec<String>,
        permissions: Vec<String>,
    ) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = ManagementClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            org: org.map(|id| id.to_string()),
            roles,
            permissions,
            iss: self.config.issuer.clone(),
            iat: now,
            exp: now + self.config.access_token_ttl_secs,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a management token, checking signature, expiry, and issuer
    pub fn verify_token(&self, token: &str) -> Result<ManagementClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        let data = decode::<ManagementClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> JwtManager {
        JwtManager::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            issuer: "janus-admin".to_string(),
            access_token_ttl_secs: 3600,
        })
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let manager = test_manager();
        let user_id = Uuid::new_v4();
        let org_id = Uuid::new_v4();

        let token = manager
            .issue_token(
                user_id,
                "admin@janus.io",
                Some(org_id),
                vec!["admin".to_string()],
                vec!["domain:write".to_string()],
            )
            .unwrap();

        let claims = manager.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "admin@janus.io");
        assert_eq!(claims.org, Some(org_id.to_string()));
        assert_eq!(claims.roles, vec!["admin"]);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let manager = test_manager();
        let other = JwtManager::new(JwtConfig {
            secret: "different-secret".to_string(),
            issuer: "janus-admin".to_string(),
            access_token_ttl_secs: 3600,
        });

        let token = other
            .issue_token(Uuid::new_v4(), "admin@janus.io", None, vec![], vec![])
            .unwrap();

        assert!(manager.verify_token(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_issuer() {
        let manager = test_manager();
        let other = JwtManager::new(JwtConfig {
            secret: "unit-test-secret".to_string(),
            issuer: "someone-else".to_string(),
            access_token_ttl_secs: 3600,
        });

        let token = other
            .issue_token(Uuid::new_v4(), "admin@janus.io", None, vec![], vec![])
            .unwrap();

        assert!(manager.verify_token(&token).is_err());
    }
}
