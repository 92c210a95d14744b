//! Entrypoint API handlers

use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateEntrypointInput, UpdateEntrypointInput, UuidStr};
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
    Path(org_id): Path<UuidStr>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let _ = state.organization_service.get(&org_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::EntrypointRead,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let (items, total) = state
        .entrypoint_service
        .list(&org_id, pagination.page, pagination.per_page)
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
    Path((org_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let _ = state.organization_service.get(&org_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::EntrypointRead,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let item = state.entrypoint_service.get(&org_id, &id).await?;
    Ok(Json(SuccessResponse::new(item)))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(org_id): Path<UuidStr>,
    Json(input): Json<CreateEntrypointInput>,
) -> Result<impl IntoResponse> {
    let _ = state.organization_service.get(&org_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::EntrypointWrite,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let item = state.entrypoint_service.create(&org_id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(org_id),
        "entrypoint.create",
        "entrypoint",
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
    Path((org_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateEntrypointInput>,
) -> Result<impl IntoResponse> {
    let _ = state.organization_service.get(&org_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::EntrypointWrite,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let before = state.entrypoint_service.get(&org_id, &id).await?;
    let item = state.entrypoint_service.update(&org_id, &id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(org_id),
        "entrypoint.update",
        "entrypoint",
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
    Path((org_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let _ = state.organization_service.get(&org_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::EntrypointWrite,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let before = state.entrypoint_service.get(&org_id, &id).await?;
    state.entrypoint_service.delete(&org_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(org_id),
        "entrypoint.delete",
        "entrypoint",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Entrypoint deleted successfully")))
}
