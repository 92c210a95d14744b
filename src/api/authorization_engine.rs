//! Authorization engine API handlers

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateAuthorizationEngineInput, UpdateAuthorizationEngineInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// List authorization_engines in a domain
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
        .authorization_engine_service
        .list(&domain_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get authorization_engine by id
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

    let item = state.authorization_engine_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(item)))
}

/// Create authorization_engine
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateAuthorizationEngineInput>,
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

    let item = state.authorization_engine_service.create(&domain_id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_engine.create",
        "authorization_engine",
        Some(item.id),
        None,
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(item))))
}

/// Update authorization_engine
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateAuthorizationEngineInput>,
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

    let before = state.authorization_engine_service.get(&domain_id, &id).await?;
    let item = state.authorization_engine_service.update(&domain_id, &id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_engine.update",
        "authorization_engine",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(item)))
}

/// Delete authorization_engine
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

    let before = state.authorization_engine_service.get(&domain_id, &id).await?;
    state.authorization_engine_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "authorization_engine.delete",
        "authorization_engine",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Authorization engine deleted successfully")))
}
