//! Organization API handlers

use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateOrganizationInput, UpdateOrganizationInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// List organizations (platform admin only)
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::OrganizationRead,
            scope: ResourceScope::Platform,
        },
    )?;

    let (organizations, total) = state
        .organization_service
        .list(pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        organizations,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get organization by id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UuidStr>,
) -> Result<impl IntoResponse> {
    let organization = state.organization_service.get(&id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::OrganizationRead,
            scope: ResourceScope::Organization(id),
        },
    )?;
    Ok(Json(SuccessResponse::new(organization)))
}

/// Create organization (platform admin only)
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(input): Json<CreateOrganizationInput>,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::OrganizationWrite,
            scope: ResourceScope::Platform,
        },
    )?;

    let organization = state.organization_service.create(input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(organization.id),
        "organization.create",
        "organization",
        Some(organization.id),
        None,
        serde_json::to_value(&organization).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(organization))))
}

/// Update organization
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<UuidStr>,
    Json(input): Json<UpdateOrganizationInput>,
) -> Result<impl IntoResponse> {
    let before = state.organization_service.get(&id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::OrganizationWrite,
            scope: ResourceScope::Organization(id),
        },
    )?;

    let organization = state.organization_service.update(&id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(id),
        "organization.update",
        "organization",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&organization).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(organization)))
}

/// Delete organization; refused while it still owns domains
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<UuidStr>,
) -> Result<impl IntoResponse> {
    let before = state.organization_service.get(&id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::OrganizationWrite,
            scope: ResourceScope::Platform,
        },
    )?;

    state.organization_service.delete(&id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(id),
        "organization.delete",
        "organization",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new(
        "Organization deleted successfully",
    )))
}
