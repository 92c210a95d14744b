//! Certificate API handlers

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateCertificateInput, UpdateCertificateInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// List certificates in a domain
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
            action: PolicyAction::CertificateRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let (items, total) = state
        .certificate_service
        .list(&domain_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Get certificate by id
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
            action: PolicyAction::CertificateRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let item = state.certificate_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(item)))
}

/// Create certificate
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateCertificateInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::CertificateWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let item = state.certificate_service.create(&domain_id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "certificate.create",
        "certificate",
        Some(item.id),
        None,
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(item))))
}

/// Update certificate
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateCertificateInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::CertificateWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.certificate_service.get(&domain_id, &id).await?;
    let item = state.certificate_service.update(&domain_id, &id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "certificate.update",
        "certificate",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(item)))
}

/// Delete certificate
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
            action: PolicyAction::CertificateWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.certificate_service.get(&domain_id, &id).await?;
    state.certificate_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "certificate.delete",
        "certificate",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Certificate deleted successfully")))
}
