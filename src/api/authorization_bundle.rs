//! Authorization bundle API handlers
//!
//! Bundles are immutable snapshots pinning a policy set, entity store, and
//! schema version together. They can be created, read, and deleted; there is
//! no update.

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateAuthorizationBundleInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(domain_id): Path<UuidStr>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::AuthorizationRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let (bundles, total) = state
        .authorization_bundle_service
        .list(&domain_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        bundles,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::AuthorizationRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let bundle = state
        .authorization_bundle_service
        .get(&domain_id, &id)
        .await?;
    Ok(Json(SuccessResponse::new(bundle)))
}

/// Create a bundle; component versions default to the current head when
/// omitted
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateAuthorizationBundleInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::AuthorizationWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let bundle = state
        .authorization_bundle_service
        .create(&domain_id, input, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_bundle.create",
        "authorization_bundle",
        Some(bundle.id),
        None,
        serde_json::to_value(&bundle).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(bundle))))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::AuthorizationWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state
        .authorization_bundle_service
        .get(&domain_id, &id)
        .await?;
    state
        .authorization_bundle_service
        .delete(&domain_id, &id)
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_bundle.delete",
        "authorization_bundle",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new(
        "Authorization bundle deleted successfully",
    )))
}
