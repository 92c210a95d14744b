//! Business logic layer
//!
//! Services are generic over repository traits so unit tests can substitute
//! mockall doubles. Parent existence (organization/domain) is resolved by the
//! API layer before any child service call; services still guard against a
//! child fetched through the wrong parent.

pub mod application;
pub mod audit;
pub mod authorization_bundle;
pub mod authorization_engine;
pub mod authorization_schema;
pub mod certificate;
pub mod domain;
pub mod entity_store;
pub mod entrypoint;
pub mod flow;
pub mod group;
pub mod identity_provider;
pub mod membership;
pub mod organization;
pub mod password_policy;
pub mod policy_set;
pub mod role;
pub mod scope;
pub mod tag;
pub mod theme;
pub mod user;

pub use application::ApplicationService;
pub use audit::AuditService;
pub use authorization_bundle::AuthorizationBundleService;
pub use authorization_engine::AuthorizationEngineService;
pub use authorization_schema::AuthorizationSchemaService;
pub use certificate::CertificateService;
pub use domain::DomainService;
pub use entity_store::EntityStoreService;
pub use entrypoint::EntrypointService;
pub use flow::FlowService;
pub use group::GroupService;
pub use identity_provider::IdentityProviderService;
pub use membership::MembershipService;
pub use organization::OrganizationService;
pub use password_policy::PasswordPolicyService;
pub use policy_set::PolicySetService;
pub use role::RoleService;
pub use scope::ScopeService;
pub use tag::TagService;
pub use theme::ThemeService;
pub use user::UserService;
