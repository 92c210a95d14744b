//! Theme API handlers
//!
//! A domain holds at most one theme, so list returns zero or one entry.

use crate::api::domain::resolve_domain;
use crate::api::{write_audit_log, MessageResponse, SuccessResponse};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateThemeInput, UpdateThemeInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(domain_id): Path<UuidStr>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::ThemeRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let themes = state.theme_service.list(&domain_id).await?;
    Ok(Json(SuccessResponse::new(themes)))
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
            action: PolicyAction::ThemeRead,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let theme = state.theme_service.get(&domain_id, &id).await?;
    Ok(Json(SuccessResponse::new(theme)))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateThemeInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::ThemeWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let theme = state.theme_service.create(&domain_id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "theme.create",
        "theme",
        Some(theme.id),
        None,
        serde_json::to_value(&theme).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(theme))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateThemeInput>,
) -> Result<impl IntoResponse> {
    let domain = resolve_domain(&state, &domain_id).await?;
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::ThemeWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.theme_service.get(&domain_id, &id).await?;
    let theme = state.theme_service.update(&domain_id, &id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "theme.update",
        "theme",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&theme).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(theme)))
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
            action: PolicyAction::ThemeWrite,
            scope: ResourceScope::Organization(domain.organization_id),
        },
    )?;

    let before = state.theme_service.get(&domain_id, &id).await?;
    state.theme_service.delete(&domain_id, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(domain.organization_id),
        "theme.delete",
        "theme",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Theme deleted successfully")))
}
