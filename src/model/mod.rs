//! Data model: persisted entities and their validated input types

pub mod application;
pub mod audit;
pub mod authorization;
pub mod certificate;
pub mod common;
pub mod domain;
pub mod entrypoint;
pub mod flow;
pub mod group;
pub mod identity_provider;
pub mod membership;
pub mod organization;
pub mod password_policy;
pub mod role;
pub mod scope;
pub mod tag;
pub mod theme;
pub mod user;

pub use application::{Application, ApplicationType, CreateApplicationInput, UpdateApplicationInput};
pub use audit::{AuditLog, AuditLogQuery, CreateAuditLogInput};
pub use authorization::{
    AuthorizationBundle, AuthorizationEngine, AuthorizationSchema, AuthorizationSchemaVersion,
    CreateAuthorizationBundleInput, CreateAuthorizationEngineInput, CreateAuthorizationSchemaInput,
    CreateEntityStoreInput, CreatePolicySetInput, EngineType, EntityStore, EntityStoreVersion,
    PolicySet, PolicySetVersion, UpdateAuthorizationEngineInput, UpdateAuthorizationSchemaInput,
    UpdateEntityStoreInput, UpdatePolicySetInput,
};
pub use certificate::{Certificate, CreateCertificateInput, UpdateCertificateInput};
pub use common::{Reference, ReferenceType, UuidStr};
pub use domain::{CreateDomainInput, Domain, UpdateDomainInput};
pub use entrypoint::{CreateEntrypointInput, Entrypoint, UpdateEntrypointInput};
pub use flow::{CreateFlowInput, Flow, FlowType, UpdateFlowInput};
pub use group::{CreateGroupInput, Group, UpdateGroupInput};
pub use identity_provider::{
    CreateIdentityProviderInput, IdentityProvider, UpdateIdentityProviderInput,
};
pub use membership::{CreateMembershipInput, MemberType, Membership, UpdateMembershipInput};
pub use organization::{CreateOrganizationInput, Organization, UpdateOrganizationInput};
pub use password_policy::{
    CreatePasswordPolicyInput, PasswordPolicy, UpdatePasswordPolicyInput,
};
pub use role::{CreateRoleInput, Role, UpdateRoleInput};
pub use scope::{CreateScopeInput, Scope, UpdateScopeInput};
pub use tag::{CreateTagInput, Tag, UpdateTagInput};
pub use theme::{CreateThemeInput, Theme, UpdateThemeInput};
pub use user::{CreateUserInput, ResetPasswordInput, UpdateUserInput, User};
