//! Authorization schema API handlers
//!
//! Content updates append an immutable version; the versions sub-resource
//! exposes history, point lookup, and restore.

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateAuthorizationSchemaInput, UpdateAuthorizationSchemaInput, UuidStr};
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

    let (items, total) = state
        .authorization_schema_service
        .list(&domain_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        items,
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

    let item = state.authorization_schema_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(item)))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateAuthorizationSchemaInput>,
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

    let item = state
        .authorization_schema_service
        .create(&domain_id, input, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_schema.create",
        "authorization_schema",
        Some(item.id),
        None,
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(item))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateAuthorizationSchemaInput>,
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

    let before = state.authorization_schema_service.get(&domain_id, &id).await?;
    let item = state
        .authorization_schema_service
        .update(&domain_id, &id, input, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_schema.update",
        "authorization_schema",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(item)))
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

    let before = state.authorization_schema_service.get(&domain_id, &id).await?;
    state.authorization_schema_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_schema.delete",
        "authorization_schema",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Authorization schema deleted successfully")))
}

/// Version history, newest first
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
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

    let (versions, total) = state
        .authorization_schema_service
        .list_versions(&domain_id, &id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        versions,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

pub async fn get_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((domain_id, id, version)): Path<(UuidStr, UuidStr, i64)>,
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

    let record = state.authorization_schema_service.get_version(&domain_id, &id, version).await?;
    Ok(Json(SuccessResponse::new(record)))
}

/// Re-emit an old version's content as the new head version
pub async fn restore_version(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id, version)): Path<(UuidStr, UuidStr, i64)>,
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

    let record = state
        .authorization_schema_service
        .restore_version(&domain_id, &id, version, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_schema.restore_version",
        "authorization_schema",
        Some(id),
        None,
        serde_json::to_value(&record).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(record))))
}
