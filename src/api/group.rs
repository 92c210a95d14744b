//! Group API handlers
//!
//! Groups attach to a reference: the organization or domain named in the
//! request path. Both nestings share the same logic, differing only in how
//! the reference and policy scope are resolved.

use crate::api::{
    resolve_domain_reference, resolve_organization_reference, write_audit_log, MessageResponse,
    PaginatedResponse, PaginationQuery, SuccessResponse,
};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::{CreateGroupInput, Reference, UpdateGroupInput, UuidStr};
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

async fn list_inner(
    state: AppState,
    auth: AuthUser,
    reference: Reference,
    organization_id: UuidStr,
    pagination: PaginationQuery,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::GroupRead,
            scope: ResourceScope::Organization(organization_id),
        },
    )?;

    let (items, total) = state
        .group_service
        .list(&reference, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        items,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

async fn get_inner(
    state: AppState,
    auth: AuthUser,
    reference: Reference,
    organization_id: UuidStr,
    id: UuidStr,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::GroupRead,
            scope: ResourceScope::Organization(organization_id),
        },
    )?;

    let item = state.group_service.get(&reference, &id).await?;
    Ok(Json(SuccessResponse::new(item)))
}

async fn create_inner(
    state: AppState,
    auth: AuthUser,
    headers: HeaderMap,
    reference: Reference,
    organization_id: UuidStr,
    input: CreateGroupInput,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::GroupWrite,
            scope: ResourceScope::Organization(organization_id),
        },
    )?;

    let item = state.group_service.create(&reference, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(organization_id),
        "group.create",
        "group",
        Some(item.id),
        None,
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(item))))
}

async fn update_inner(
    state: AppState,
    auth: AuthUser,
    headers: HeaderMap,
    reference: Reference,
    organization_id: UuidStr,
    id: UuidStr,
    input: UpdateGroupInput,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::GroupWrite,
            scope: ResourceScope::Organization(organization_id),
        },
    )?;

    let before = state.group_service.get(&reference, &id).await?;
    let item = state.group_service.update(&reference, &id, input).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(organization_id),
        "group.update",
        "group",
        Some(id),
        serde_json::to_value(&before).ok(),
        serde_json::to_value(&item).ok(),
    )
    .await;
    Ok(Json(SuccessResponse::new(item)))
}

async fn delete_inner(
    state: AppState,
    auth: AuthUser,
    headers: HeaderMap,
    reference: Reference,
    organization_id: UuidStr,
    id: UuidStr,
) -> Result<impl IntoResponse> {
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::GroupWrite,
            scope: ResourceScope::Organization(organization_id),
        },
    )?;

    let before = state.group_service.get(&reference, &id).await?;
    state.group_service.delete(&reference, &id).await?;
    write_audit_log(
        &state,
        &auth,
        &headers,
        Some(organization_id),
        "group.delete",
        "group",
        Some(id),
        serde_json::to_value(&before).ok(),
        None,
    )
    .await;
    Ok(Json(MessageResponse::new("Group deleted successfully")))
}

pub async fn list_in_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(org_id): Path<UuidStr>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_organization_reference(&state, org_id).await?;
    list_inner(state, auth, reference, organization_id, pagination).await
}

pub async fn list_in_domain(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(domain_id): Path<UuidStr>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_domain_reference(&state, domain_id).await?;
    list_inner(state, auth, reference, organization_id, pagination).await
}

pub async fn get_in_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((org_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_organization_reference(&state, org_id).await?;
    get_inner(state, auth, reference, organization_id, id).await
}

pub async fn get_in_domain(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_domain_reference(&state, domain_id).await?;
    get_inner(state, auth, reference, organization_id, id).await
}

pub async fn create_in_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(org_id): Path<UuidStr>,
    Json(input): Json<CreateGroupInput>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_organization_reference(&state, org_id).await?;
    create_inner(state, auth, headers, reference, organization_id, input).await
}

pub async fn create_in_domain(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path(domain_id): Path<UuidStr>,
    Json(input): Json<CreateGroupInput>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_domain_reference(&state, domain_id).await?;
    create_inner(state, auth, headers, reference, organization_id, input).await
}

pub async fn update_in_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((org_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateGroupInput>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_organization_reference(&state, org_id).await?;
    update_inner(state, auth, headers, reference, organization_id, id, input).await
}

pub async fn update_in_domain(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
    Json(input): Json<UpdateGroupInput>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_domain_reference(&state, domain_id).await?;
    update_inner(state, auth, headers, reference, organization_id, id, input).await
}

pub async fn delete_in_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((org_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_organization_reference(&state, org_id).await?;
    delete_inner(state, auth, headers, reference, organization_id, id).await
}

pub async fn delete_in_domain(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Path((domain_id, id)): Path<(UuidStr, UuidStr)>,
) -> Result<impl IntoResponse> {
    let (reference, organization_id) = resolve_domain_reference(&state, domain_id).await?;
    delete_inner(state, auth, headers, reference, organization_id, id).await
}
