//! JWT authentication extractor
//!
//! `AuthUser` validates the Bearer token from the Authorization header and
//! hands the caller's identity to handlers. Routes without it are public.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::jwt::{JwtManager, ManagementClaims};
use crate::model::UuidStr;

/// State capable of verifying management tokens
pub trait AuthState {
    fn jwt_manager(&self) -> &JwtManager;
}

/// Authenticated administrator extracted from a management token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    /// Administrator id from the token's `sub` claim
    pub user_id: Uuid,
    pub email: String,
    /// Organization scope; absent for platform-level tokens
    pub organization_id: Option<UuidStr>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn from_claims(claims: ManagementClaims) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidToken("Invalid user id in token".to_string()))?;

        let organization_id = claims
            .org
            .as_deref()
            .map(|org| {
                org.parse::<UuidStr>().map_err(|_| {
                    AuthError::InvalidToken("Invalid organization id in token".to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            user_id,
            email: claims.email,
            organization_id,
            roles: claims.roles,
            permissions: claims.permissions,
        })
    }
}

#[derive(Debug, Clone)]
pub enum AuthError {
    MissingToken,
    InvalidHeader(String),
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing authorization token",
            AuthError::InvalidHeader(_) => "Invalid authorization header",
            AuthError::InvalidToken(_) => "Invalid token",
        };

        let body = serde_json::json!({
            "error": "UNAUTHORIZED",
            "message": message,
        });

        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("Invalid header encoding".to_string()))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AuthError::InvalidHeader(
            "Authorization header must use Bearer scheme".to_string(),
        ));
    }

    Ok(&auth_header[7..])
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: AuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state
            .jwt_manager()
            .verify_token(token)
            .map_err(|_| AuthError::InvalidToken("Token validation failed".to_string()))?;
        AuthUser::from_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(org: Option<String>) -> ManagementClaims {
        ManagementClaims {
            sub: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            email: "admin@acme.io".to_string(),
            org,
            roles: vec!["admin".to_string()],
            permissions: vec!["domain:write".to_string()],
            iss: "janus-admin".to_string(),
            iat: 1000000,
            exp: 1003600,
        }
    }

    #[test]
    fn test_from_claims_with_org_scope() {
        let org_id = Uuid::new_v4();
        let user = AuthUser::from_claims(claims(Some(org_id.to_string()))).unwrap();
        assert_eq!(
            user.user_id,
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap()
        );
        assert_eq!(user.organization_id.map(|id| id.to_string()), Some(org_id.to_string()));
        assert_eq!(user.roles, vec!["admin"]);
    }

    #[test]
    fn test_from_claims_platform_token() {
        let user = AuthUser::from_claims(claims(None)).unwrap();
        assert!(user.organization_id.is_none());
    }

    #[test]
    fn test_from_claims_rejects_bad_subject() {
        let mut claims = claims(None);
        claims.sub = "not-a-uuid".to_string();
        assert!(AuthUser::from_claims(claims).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert!(extract_bearer_token(&headers).is_err());
    }
}
