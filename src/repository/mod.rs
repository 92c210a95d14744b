//! Data access layer (Repository pattern)

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

pub use application::ApplicationRepository;
pub use audit::AuditRepository;
pub use authorization_bundle::AuthorizationBundleRepository;
pub use authorization_engine::AuthorizationEngineRepository;
pub use authorization_schema::AuthorizationSchemaRepository;
pub use certificate::CertificateRepository;
pub use domain::DomainRepository;
pub use entity_store::EntityStoreRepository;
pub use entrypoint::EntrypointRepository;
pub use flow::FlowRepository;
pub use group::GroupRepository;
pub use identity_provider::IdentityProviderRepository;
pub use membership::MembershipRepository;
pub use organization::OrganizationRepository;
pub use password_policy::PasswordPolicyRepository;
pub use policy_set::PolicySetRepository;
pub use role::RoleRepository;
pub use scope::ScopeRepository;
pub use tag::TagRepository;
pub use theme::ThemeRepository;
pub use user::UserRepository;
