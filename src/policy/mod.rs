//! Centralized authorization policy for HTTP handlers.
//!
//! Every mutating or sensitive route builds a `PolicyInput` and calls
//! [`enforce`] before touching a service. Decisions use only the token and
//! static configuration; handlers resolve the organization scope (a domain
//! resource is checked against its owning organization).

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::model::UuidStr;

pub type PolicyResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    OrganizationRead,
    OrganizationWrite,
    DomainRead,
    DomainWrite,
    ApplicationRead,
    ApplicationWrite,
    IdentityProviderRead,
    IdentityProviderWrite,
    CertificateRead,
    CertificateWrite,
    RoleRead,
    RoleWrite,
    ScopeRead,
    ScopeWrite,
    GroupRead,
    GroupWrite,
    UserRead,
    UserWrite,
    ThemeRead,
    ThemeWrite,
    PasswordPolicyRead,
    PasswordPolicyWrite,
    FlowRead,
    FlowWrite,
    EntrypointRead,
    EntrypointWrite,
    TagRead,
    TagWrite,
    MembershipRead,
    MembershipWrite,
    AuthorizationRead,
    AuthorizationWrite,
    AuditRead,
}

impl PolicyAction {
    /// Permission strings satisfying this action, in addition to the
    /// admin/owner roles. Reads accept the matching write permission.
    fn permissions(&self) -> &'static [&'static str] {
        match self {
            PolicyAction::OrganizationRead => {
                &["organization:read", "organization:write", "organization:*"]
            }
            PolicyAction::OrganizationWrite => &["organization:write", "organization:*"],
            PolicyAction::DomainRead => &["domain:read", "domain:write", "domain:*"],
            PolicyAction::DomainWrite => &["domain:write", "domain:*"],
            PolicyAction::ApplicationRead => {
                &["application:read", "application:write", "application:*"]
            }
            PolicyAction::ApplicationWrite => &["application:write", "application:*"],
            PolicyAction::IdentityProviderRead => {
                &["identity_provider:read", "identity_provider:write", "identity_provider:*"]
            }
            PolicyAction::IdentityProviderWrite => {
                &["identity_provider:write", "identity_provider:*"]
            }
            PolicyAction::CertificateRead => {
                &["certificate:read", "certificate:write", "certificate:*"]
            }
            PolicyAction::CertificateWrite => &["certificate:write", "certificate:*"],
            PolicyAction::RoleRead => &["role:read", "role:write", "role:*"],
            PolicyAction::RoleWrite => &["role:write", "role:*"],
            PolicyAction::ScopeRead => &["scope:read", "scope:write", "scope:*"],
            PolicyAction::ScopeWrite => &["scope:write", "scope:*"],
            PolicyAction::GroupRead => &["group:read", "group:write", "group:*"],
            PolicyAction::GroupWrite => &["group:write", "group:*"],
            PolicyAction::UserRead => &["user:read", "user:write", "user:*"],
            PolicyAction::UserWrite => &["user:write", "user:*"],
            PolicyAction::ThemeRead => &["theme:read", "theme:write", "theme:*"],
            PolicyAction::ThemeWrite => &["theme:write", "theme:*"],
            PolicyAction::PasswordPolicyRead => {
                &["password_policy:read", "password_policy:write", "password_policy:*"]
            }
            PolicyAction::PasswordPolicyWrite => &["password_policy:write", "password_policy:*"],
            PolicyAction::FlowRead => &["flow:read", "flow:write", "flow:*"],
            PolicyAction::FlowWrite => &["flow:write", "flow:*"],
            PolicyAction::EntrypointRead => {
                &["entrypoint:read", "entrypoint:write", "entrypoint:*"]
            }
            PolicyAction::EntrypointWrite => &["entrypoint:write", "entrypoint:*"],
            PolicyAction::TagRead => &["tag:read", "tag:write", "tag:*"],
            PolicyAction::TagWrite => &["tag:write", "tag:*"],
            PolicyAction::MembershipRead => {
                &["membership:read", "membership:write", "membership:*"]
            }
            PolicyAction::MembershipWrite => &["membership:write", "membership:*"],
            PolicyAction::AuthorizationRead => {
                &["authorization:read", "authorization:write", "authorization:*"]
            }
            PolicyAction::AuthorizationWrite => &["authorization:write", "authorization:*"],
            PolicyAction::AuditRead => &["audit:read", "audit:*"],
        }
    }
}

/// Organization the target resource lives in. Domain-level resources are
/// checked against the domain's owning organization, which the handler has
/// already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    /// Platform-wide resources (organization creation, cross-org audit)
    Platform,
    Organization(UuidStr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    pub action: PolicyAction,
    pub scope: ResourceScope,
}

pub fn enforce(config: &Config, auth: &AuthUser, input: &PolicyInput) -> PolicyResult<()> {
    // Platform admins bypass all scope and permission checks
    if config.is_platform_admin_email(&auth.email) {
        return Ok(());
    }

    match input.scope {
        ResourceScope::Platform => Err(AppError::Forbidden(
            "Platform admin required".to_string(),
        )),
        ResourceScope::Organization(organization_id) => {
            require_organization_scope(auth, organization_id)?;
            require_admin_or_permission(auth, input.action.permissions())
        }
    }
}

fn require_organization_scope(auth: &AuthUser, organization_id: UuidStr) -> PolicyResult<()> {
    let token_org = auth.organization_id.ok_or_else(|| {
        AppError::Forbidden("No organization context in token".to_string())
    })?;

    if token_org != organization_id {
        return Err(AppError::Forbidden(
            "Cannot access another organization".to_string(),
        ));
    }

    Ok(())
}

fn require_admin_or_permission(auth: &AuthUser, permissions: &[&str]) -> PolicyResult<()> {
    let is_admin = auth.roles.iter().any(|r| r == "owner" || r == "admin");
    let has_permission = permissions
        .iter()
        .any(|permission| auth.permissions.iter().any(|p| p == permission));

    if is_admin || has_permission {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Admin role or required permission is missing".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_config(platform_admins: Vec<String>) -> Config {
        Config::for_tests(platform_admins)
    }

    fn platform_admin() -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "root@platform.io".to_string(),
            organization_id: None,
            roles: vec![],
            permissions: vec![],
        }
    }

    fn org_admin(organization_id: UuidStr) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "admin@acme.io".to_string(),
            organization_id: Some(organization_id),
            roles: vec!["admin".to_string()],
            permissions: vec![],
        }
    }

    fn org_member(organization_id: UuidStr, permissions: Vec<String>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "member@acme.io".to_string(),
            organization_id: Some(organization_id),
            roles: vec![],
            permissions,
        }
    }

    #[test]
    fn test_platform_admin_bypasses_everything() {
        let config = test_config(vec!["root@platform.io".to_string()]);
        let input = PolicyInput {
            action: PolicyAction::OrganizationWrite,
            scope: ResourceScope::Platform,
        };
        assert!(enforce(&config, &platform_admin(), &input).is_ok());
    }

    #[test]
    fn test_platform_scope_denies_regular_users() {
        let config = test_config(vec![]);
        let organization_id = UuidStr::new_v4();
        let input = PolicyInput {
            action: PolicyAction::OrganizationWrite,
            scope: ResourceScope::Platform,
        };
        let err = enforce(&config, &org_admin(organization_id), &input).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_org_admin_allowed_in_own_organization() {
        let config = test_config(vec![]);
        let organization_id = UuidStr::new_v4();
        let input = PolicyInput {
            action: PolicyAction::DomainWrite,
            scope: ResourceScope::Organization(organization_id),
        };
        assert!(enforce(&config, &org_admin(organization_id), &input).is_ok());
    }

    #[test]
    fn test_cross_organization_access_denied() {
        let config = test_config(vec![]);
        let input = PolicyInput {
            action: PolicyAction::DomainRead,
            scope: ResourceScope::Organization(UuidStr::new_v4()),
        };
        let err = enforce(&config, &org_admin(UuidStr::new_v4()), &input).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_write_permission_satisfies_read() {
        let config = test_config(vec![]);
        let organization_id = UuidStr::new_v4();
        let auth = org_member(organization_id, vec!["user:write".to_string()]);
        let input = PolicyInput {
            action: PolicyAction::UserRead,
            scope: ResourceScope::Organization(organization_id),
        };
        assert!(enforce(&config, &auth, &input).is_ok());
    }

    #[test]
    fn test_read_permission_does_not_satisfy_write() {
        let config = test_config(vec![]);
        let organization_id = UuidStr::new_v4();
        let auth = org_member(organization_id, vec!["user:read".to_string()]);
        let input = PolicyInput {
            action: PolicyAction::UserWrite,
            scope: ResourceScope::Organization(organization_id),
        };
        let err = enforce(&config, &auth, &input).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_wildcard_permission() {
        let config = test_config(vec![]);
        let organization_id = UuidStr::new_v4();
        let auth = org_member(organization_id, vec!["authorization:*".to_string()]);
        let input = PolicyInput {
            action: PolicyAction::AuthorizationWrite,
            scope: ResourceScope::Organization(organization_id),
        };
        assert!(enforce(&config, &auth, &input).is_ok());
    }

    #[test]
    fn test_token_without_org_context_denied() {
        let config = test_config(vec![]);
        let auth = AuthUser {
            user_id: Uuid::new_v4(),
            email: "member@acme.io".to_string(),
            organization_id: None,
            roles: vec!["admin".to_string()],
            permissions: vec![],
        };
        let input = PolicyInput {
            action: PolicyAction::DomainRead,
            scope: ResourceScope::Organization(UuidStr::new_v4()),
        };
        let err = enforce(&config, &auth, &input).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
