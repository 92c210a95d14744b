//! Password policy API handlers

use crate::api::domain::resolve_domain;
use crate::api::{
    write_audit_log, MessageResponse, PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreatePasswordPolicyInput, UpdatePasswordPolicyInput, UuidStr};
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
            action: PolicyAction::PasswordPolicyRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let (policies, total) = state
        .password_policy_service
        .list(&domain_id, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        policies,
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
            action: PolicyAction::PasswordPolicyRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let policy = state.password_policy_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(policy)))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreatePasswordPolicyInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::PasswordPolicyWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let policy = state
        .password_policy_service
        .create(&domain_id, input)
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "password_policy.create",
        "password_policy",
        Some(policy.id),
        None,
        serde_json::to_value(&policy).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(policy))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdatePasswordPolicyInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::PasswordPolicyWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.password_policy_service.get(&domain_id, &id).await?;
    let policy = state
        .password_policy_service
        .update(&domain_id, &id, input)
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "password_policy.update",
        "password_policy",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&policy).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(policy)))
}

/// Mark a policy as the domain default; new user passwords are checked
/// against it
pub async fn set_default(
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
            action: PolicyAction::PasswordPolicyWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let policy = state
        .password_policy_service
        .set_default(&domain_id, &id)
        .await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "password_policy.set_default",
        "password_policy",
        Some(id),
        None,
        serde_json::to_value(&policy).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(policy)))
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
            action: PolicyAction::PasswordPolicyWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.password_policy_service.get(&domain_id, &id).await?;
    state.password_policy_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "password_policy.delete",
        "password_policy",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new(
        "Password policy deleted successfully",
    )))
}
