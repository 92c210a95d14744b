//! OpenAPI document assembly
//!
//! Publishes service metadata and the shared response schemas at
//! `/api-docs/openapi.json` for API consumers and tooling.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Janus Admin API",
        description = "Management plane for the Janus identity and access platform",
    ),
    tags(
        (name = "System", description = "Health checks and operational endpoints"),
        (name = "Organizations", description = "Organizations, domains, and entrypoints"),
        (name = "Identity", description = "Users, groups, roles, and identity providers"),
        (name = "Applications", description = "Applications, scopes, certificates, and flows"),
        (name = "Authorization", description = "Policy sets, entity stores, schemas, and bundles"),
        (name = "Audit", description = "Management event trail"),
    ),
    security(
        ("bearer_jwt" = [])
    ),
    components(
        schemas(
            crate::api::PaginationQuery,
            crate::api::PaginationMeta,
            crate::api::MessageResponse,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn build() -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        if let Some(c) = doc.components.as_mut() {
            c.security_schemes.insert(
                "bearer_jwt".to_string(),
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
        doc
    }
}

/// Routes serving the OpenAPI document
pub fn router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::build()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_is_valid_json() {
        let doc = ApiDoc::build();
        let json = serde_json::to_string_pretty(&doc).expect("should serialize to JSON");
        let _parsed: serde_json::Value = serde_json::from_str(&json).expect("should be valid JSON");
        assert!(json.contains("\"openapi\""));
        assert!(json.contains("\"components\""));
    }

    #[test]
    fn test_openapi_spec_has_security_scheme() {
        let doc = ApiDoc::build();
        let has_bearer = doc
            .components
            .as_ref()
            .map(|c| c.security_schemes.contains_key("bearer_jwt"))
            .unwrap_or(false);
        assert!(has_bearer, "Missing bearer_jwt security scheme");
    }
}
