//! Application API handlers

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateApplicationInput, UpdateApplicationInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// List applications in a domain
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
            action: PolicyAction::ApplicationRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let (applications, total) = state
        .application_service
        .list(&domain_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        applications,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get application by id
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
            action: PolicyAction::ApplicationRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let application = state.application_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(application)))
}

/// Create application; server generates client credentials
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateApplicationInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::ApplicationWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let application = state.application_service.create(&domain_id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "application.create",
        "application",
        Some(application.id),
        None,
        serde_json::to_value(&application).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(application))))
}

/// Update application
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateApplicationInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::ApplicationWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.application_service.get(&domain_id, &id).await?;
    let application = state
        .application_service
        .update(&domain_id, &id, input)
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "application.update",
        "application",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&application).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(application)))
}

/// Delete application
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
            action: PolicyAction::ApplicationWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.application_service.get(&domain_id, &id).await?;
    state.application_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "application.delete",
        "application",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Application deleted successfully")))
}
