//! Audit log API handlers

use crate::api::{PaginatedResponse, PaginationQuery};
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::model::AuditLogQuery;
use crate::policy::{self, PolicyAction, PolicyInput, ResourceScope};
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

/// List audit logs, newest first. Platform admins may query across
/// organizations; everyone else must filter to their own organization.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AuditLogQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse> {
    let scope = match query.organization_id {
        Some(org_id) => ResourceScope::Organization(org_id),
        None => ResourceScope::Platform,
    };
    policy::enforce(
        &state.config,
        &auth,
        &PolicyInput {
            action: PolicyAction::AuditRead,
            scope,
        },
    )?;

    let (logs, total) = state
        .audit_service
        .list(query, pagination.page, pagination.per_page)
        .await?;

    Ok(Json(PaginatedResponse::new(
        logs,
        pagination.page,
        pagination.per_page,
        total,
    )))
}
