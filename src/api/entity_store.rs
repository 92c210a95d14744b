//! Entity store API handlers
//!
//! Content updates append an immutable version; the versions sub-resource
//! exposes history, point lookup, and restore.

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateEntityStoreInput, UpdateEntityStoreInput, UuidStr};
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
        .entity_store_service
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

    let item = state.entity_store_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(item)))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateEntityStoreInput>,
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
        .entity_store_service
        .create(&domain_id, input, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "entity_store.create",
        "entity_store",
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
    Json(input): Json<UpdateEntityStoreInput>,
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

    let before = state.entity_store_service.get(&domain_id, &id).await?;
    let item = state
        .entity_store_service
        .update(&domain_id, &id, input, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "entity_store.update",
        "entity_store",
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

    let before = state.entity_store_service.get(&domain_id, &id).await?;
    state.entity_store_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "entity_store.delete",
        "entity_store",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Entity store deleted successfully")))
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
        .entity_store_service
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

    let record = state.entity_store_service.get_version(&domain_id, &id, version).await?;
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
        .entity_store_service
        .restore_version(&domain_id, &id, version, Some(&auth.email))
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "entity_store.restore_version",
        "entity_store",
        Some(id),
        None,
        serde_json::to_value(&record).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(record))))
}
