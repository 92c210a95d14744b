//! Security domain API handlers
//!
//! Domains are created and listed under their organization; direct access by
//! id resolves the owning organization before policy enforcement.

use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateDomainInput, Domain, UpdateDomainInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Look up a domain by path id, 404 when absent. Used by every domain-nested
/// handler to resolve the organization scope for policy checks.
pub(crate) async fn resolve_domain(state: &AppState, domain_id: &UuidStr) -> Result<Domain> {
    state.domain_service.get(domain_id).await
}

/// List domains in an organization
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
            action: PolicyAction::DomainRead,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let (domains, total) = state
        .domain_service
        .list(&org_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        domains,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Create a domain in an organization
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(org_id): Path<UuidStr>,
    Json(input): Json<CreateDomainInput>,
) -> Result<impl IntoResponse> {
    let _ = state.organization_service.get(&org_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::DomainWrite,
            scope: ResourceScope::Organization(org_id),
        },
    )?;

    let domain = state.domain_service.create(&org_id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(org_id),
        "domain.create",
        "domain",
        Some(domain.id),
        None,
        serde_json::to_value(&domain).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(domain))))
}

/// Get domain by id
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UuidStr>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::DomainRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;
    Ok(Json(SuccessResponse::new(domain)))
}

/// Update domain
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<UuidStr>,
    Json(input): Json<UpdateDomainInput>,
) -> Result<impl IntoResponse> {
    let before = resolve_domain(&state, &id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::DomainWrite,
            scope: ResourceScope::Organization(before.organization_id),
        },
    )?;

    let domain = state.domain_service.update(&id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(before.organization_id),
        "domain.update",
        "domain",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&domain).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(domain)))
}

/// Delete domain and everything it owns
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(id): Path<UuidStr>,
) -> Result<impl IntoResponse> {
    let before = resolve_domain(&state, &id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::DomainWrite,
            scope: ResourceScope::Organization(before.organization_id),
        },
    )?;

    state.domain_service.delete(&id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(before.organization_id),
        "domain.delete",
        "domain",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Domain deleted successfully")))
}
