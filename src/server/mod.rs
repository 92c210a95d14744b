//! Server initialization and routing

use crate::api;
use crate::config::Config;
use crate::jwt::JwtManager;
use crate::middleware::{security_headers_middleware, AuthState, ObservabilityLayer};
use crate::repository::{
    application::ApplicationRepositoryImpl, audit::AuditRepositoryImpl,
    authorization_bundle::AuthorizationBundleRepositoryImpl,
    authorization_engine::AuthorizationEngineRepositoryImpl,
    authorization_schema::AuthorizationSchemaRepositoryImpl,
    certificate::CertificateRepositoryImpl, domain::DomainRepositoryImpl,
    entity_store::EntityStoreRepositoryImpl, entrypoint::EntrypointRepositoryImpl,
    flow::FlowRepositoryImpl, group::GroupRepositoryImpl,
    identity_provider::IdentityProviderRepositoryImpl, membership::MembershipRepositoryImpl,
    organization::OrganizationRepositoryImpl, password_policy::PasswordPolicyRepositoryImpl,
    policy_set::PolicySetRepositoryImpl, role::RoleRepositoryImpl, scope::ScopeRepositoryImpl,
    tag::TagRepositoryImpl, theme::ThemeRepositoryImpl, user::UserRepositoryImpl,
};
use crate::service::{
    ApplicationService, AuditService, AuthorizationBundleService, AuthorizationEngineService,
    AuthorizationSchemaService, CertificateService, DomainService, EntityStoreService,
    EntrypointService, FlowService, GroupService, IdentityProviderService, MembershipService,
    OrganizationService, PasswordPolicyService, PolicySetService, RoleService, ScopeService,
    TagService, ThemeService, UserService,
};
use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// DomainService wired to the concrete MySQL repositories. The cascade
/// delete touches every domain-scoped table, hence the parameter list.
pub type DomainServiceImpl = DomainService<
    DomainRepositoryImpl,
    ApplicationRepositoryImpl,
    IdentityProviderRepositoryImpl,
    CertificateRepositoryImpl,
    RoleRepositoryImpl,
    ScopeRepositoryImpl,
    GroupRepositoryImpl,
    UserRepositoryImpl,
    ThemeRepositoryImpl,
    PasswordPolicyRepositoryImpl,
    FlowRepositoryImpl,
    MembershipRepositoryImpl,
    AuthorizationEngineRepositoryImpl,
    PolicySetRepositoryImpl,
    EntityStoreRepositoryImpl,
    AuthorizationSchemaRepositoryImpl,
    AuthorizationBundleRepositoryImpl,
>;

pub type MembershipServiceImpl = MembershipService<
    MembershipRepositoryImpl,
    RoleRepositoryImpl,
    UserRepositoryImpl,
    GroupRepositoryImpl,
>;

pub type AuthorizationBundleServiceImpl = AuthorizationBundleService<
    AuthorizationBundleRepositoryImpl,
    PolicySetRepositoryImpl,
    EntityStoreRepositoryImpl,
    AuthorizationSchemaRepositoryImpl,
>;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub jwt_manager: JwtManager,
    pub prometheus_handle: PrometheusHandle,
    pub organization_service:
        Arc<OrganizationService<OrganizationRepositoryImpl, DomainRepositoryImpl>>,
    pub domain_service: Arc<DomainServiceImpl>,
    pub application_service: Arc<ApplicationService<ApplicationRepositoryImpl>>,
    pub identity_provider_service: Arc<IdentityProviderService<IdentityProviderRepositoryImpl>>,
    pub certificate_service: Arc<CertificateService<CertificateRepositoryImpl>>,
    pub role_service: Arc<RoleService<RoleRepositoryImpl>>,
    pub scope_service: Arc<ScopeService<ScopeRepositoryImpl>>,
    pub group_service: Arc<GroupService<GroupRepositoryImpl>>,
    pub user_service: Arc<UserService<UserRepositoryImpl, PasswordPolicyRepositoryImpl>>,
    pub theme_service: Arc<ThemeService<ThemeRepositoryImpl>>,
    pub password_policy_service: Arc<PasswordPolicyService<PasswordPolicyRepositoryImpl>>,
    pub flow_service: Arc<FlowService<FlowRepositoryImpl>>,
    pub entrypoint_service: Arc<EntrypointService<EntrypointRepositoryImpl>>,
    pub tag_service: Arc<TagService<TagRepositoryImpl>>,
    pub membership_service: Arc<MembershipServiceImpl>,
    pub authorization_engine_service:
        Arc<AuthorizationEngineService<AuthorizationEngineRepositoryImpl>>,
    pub policy_set_service: Arc<PolicySetService<PolicySetRepositoryImpl>>,
    pub entity_store_service: Arc<EntityStoreService<EntityStoreRepositoryImpl>>,
    pub authorization_schema_service:
        Arc<AuthorizationSchemaService<AuthorizationSchemaRepositoryImpl>>,
    pub authorization_bundle_service: Arc<AuthorizationBundleServiceImpl>,
    pub audit_service: Arc<AuditService<AuditRepositoryImpl>>,
}

impl AuthState for AppState {
    fn jwt_manager(&self) -> &JwtManager {
        &self.jwt_manager
    }
}

/// Run the server
pub async fn run(config: Config, prometheus_handle: PrometheusHandle) -> Result<()> {
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    let state = build_state(config, db_pool, prometheus_handle);
    let http_addr = state.config.http_addr();
    let app = build_router(state);

    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Wire repositories and services onto a connection pool
pub fn build_state(
    config: Config,
    db_pool: MySqlPool,
    prometheus_handle: PrometheusHandle,
) -> AppState {
    let organization_repo = Arc::new(OrganizationRepositoryImpl::new(db_pool.clone()));
    let domain_repo = Arc::new(DomainRepositoryImpl::new(db_pool.clone()));
    let application_repo = Arc::new(ApplicationRepositoryImpl::new(db_pool.clone()));
    let identity_provider_repo = Arc::new(IdentityProviderRepositoryImpl::new(db_pool.clone()));
    let certificate_repo = Arc::new(CertificateRepositoryImpl::new(db_pool.clone()));
    let role_repo = Arc::new(RoleRepositoryImpl::new(db_pool.clone()));
    let scope_repo = Arc::new(ScopeRepositoryImpl::new(db_pool.clone()));
    let group_repo = Arc::new(GroupRepositoryImpl::new(db_pool.clone()));
    let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
    let theme_repo = Arc::new(ThemeRepositoryImpl::new(db_pool.clone()));
    let password_policy_repo = Arc::new(PasswordPolicyRepositoryImpl::new(db_pool.clone()));
    let flow_repo = Arc::new(FlowRepositoryImpl::new(db_pool.clone()));
    let entrypoint_repo = Arc::new(EntrypointRepositoryImpl::new(db_pool.clone()));
    let tag_repo = Arc::new(TagRepositoryImpl::new(db_pool.clone()));
    let membership_repo = Arc::new(MembershipRepositoryImpl::new(db_pool.clone()));
    let authorization_engine_repo =
        Arc::new(AuthorizationEngineRepositoryImpl::new(db_pool.clone()));
    let policy_set_repo = Arc::new(PolicySetRepositoryImpl::new(db_pool.clone()));
    let entity_store_repo = Arc::new(EntityStoreRepositoryImpl::new(db_pool.clone()));
    let authorization_schema_repo =
        Arc::new(AuthorizationSchemaRepositoryImpl::new(db_pool.clone()));
    let authorization_bundle_repo =
        Arc::new(AuthorizationBundleRepositoryImpl::new(db_pool.clone()));
    let audit_repo = Arc::new(AuditRepositoryImpl::new(db_pool.clone()));

    let jwt_manager = JwtManager::new(config.jwt.clone());

    let organization_service = Arc::new(OrganizationService::new(
        organization_repo.clone(),
        domain_repo.clone(),
    ));
    let domain_service = Arc::new(DomainService::new(
        domain_repo.clone(),
        application_repo.clone(),
        identity_provider_repo.clone(),
        certificate_repo.clone(),
        role_repo.clone(),
        scope_repo.clone(),
        group_repo.clone(),
        user_repo.clone(),
        theme_repo.clone(),
        password_policy_repo.clone(),
        flow_repo.clone(),
        membership_repo.clone(),
        authorization_engine_repo.clone(),
        policy_set_repo.clone(),
        entity_store_repo.clone(),
        authorization_schema_repo.clone(),
        authorization_bundle_repo.clone(),
    ));
    let application_service = Arc::new(ApplicationService::new(application_repo));
    let identity_provider_service =
        Arc::new(IdentityProviderService::new(identity_provider_repo));
    let certificate_service = Arc::new(CertificateService::new(certificate_repo));
    let role_service = Arc::new(RoleService::new(role_repo.clone()));
    let scope_service = Arc::new(ScopeService::new(scope_repo));
    let group_service = Arc::new(GroupService::new(group_repo.clone()));
    let user_service = Arc::new(UserService::new(
        user_repo.clone(),
        password_policy_repo.clone(),
    ));
    let theme_service = Arc::new(ThemeService::new(theme_repo));
    let password_policy_service = Arc::new(PasswordPolicyService::new(password_policy_repo));
    let flow_service = Arc::new(FlowService::new(flow_repo));
    let entrypoint_service = Arc::new(EntrypointService::new(entrypoint_repo));
    let tag_service = Arc::new(TagService::new(tag_repo));
    let membership_service = Arc::new(MembershipService::new(
        membership_repo,
        role_repo,
        user_repo,
        group_repo,
    ));
    let authorization_engine_service =
        Arc::new(AuthorizationEngineService::new(authorization_engine_repo));
    let policy_set_service = Arc::new(PolicySetService::new(policy_set_repo.clone()));
    let entity_store_service = Arc::new(EntityStoreService::new(entity_store_repo.clone()));
    let authorization_schema_service = Arc::new(AuthorizationSchemaService::new(
        authorization_schema_repo.clone(),
    ));
    let authorization_bundle_service = Arc::new(AuthorizationBundleService::new(
        authorization_bundle_repo,
        policy_set_repo,
        entity_store_repo,
        authorization_schema_repo,
    ));
    let audit_service = Arc::new(AuditService::new(audit_repo));

    AppState {
        config: Arc::new(config),
        db_pool,
        jwt_manager,
        prometheus_handle,
        organization_service,
        domain_service,
        application_service,
        identity_provider_service,
        certificate_service,
        role_service,
        scope_service,
        group_service,
        user_service,
        theme_service,
        password_policy_service,
        flow_service,
        entrypoint_service,
        tag_service,
        membership_service,
        authorization_engine_service,
        policy_set_service,
        entity_store_service,
        authorization_schema_service,
        authorization_bundle_service,
        audit_service,
    }
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Probes and operational endpoints
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready))
        .route("/metrics", get(api::metrics::render))
        .merge(crate::openapi::router())
        // Organizations
        .route(
            "/api/v1/organizations",
            get(api::organization::list).post(api::organization::create),
        )
        .route(
            "/api/v1/organizations/{id}",
            get(api::organization::get)
                .put(api::organization::update)
                .delete(api::organization::delete),
        )
        // Domains
        .route(
            "/api/v1/organizations/{org_id}/domains",
            get(api::domain::list).post(api::domain::create),
        )
        .route(
            "/api/v1/domains/{id}",
            get(api::domain::get)
                .put(api::domain::update)
                .delete(api::domain::delete),
        )
        // Organization-scoped reference entities
        .route(
            "/api/v1/organizations/{org_id}/identity-providers",
            get(api::identity_provider::list_in_organization)
                .post(api::identity_provider::create_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/identity-providers/{id}",
            get(api::identity_provider::get_in_organization)
                .put(api::identity_provider::update_in_organization)
                .delete(api::identity_provider::delete_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/roles",
            get(api::role::list_in_organization).post(api::role::create_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/roles/{id}",
            get(api::role::get_in_organization)
                .put(api::role::update_in_organization)
                .delete(api::role::delete_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/groups",
            get(api::group::list_in_organization).post(api::group::create_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/groups/{id}",
            get(api::group::get_in_organization)
                .put(api::group::update_in_organization)
                .delete(api::group::delete_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/users",
            get(api::user::list_in_organization).post(api::user::create_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/users/{id}",
            get(api::user::get_in_organization)
                .put(api::user::update_in_organization)
                .delete(api::user::delete_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/members",
            get(api::membership::list_in_organization)
                .post(api::membership::create_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/members/{id}",
            get(api::membership::get_in_organization)
                .put(api::membership::update_in_organization)
                .delete(api::membership::delete_in_organization),
        )
        .route(
            "/api/v1/organizations/{org_id}/entrypoints",
            get(api::entrypoint::list).post(api::entrypoint::create),
        )
        .route(
            "/api/v1/organizations/{org_id}/entrypoints/{id}",
            get(api::entrypoint::get)
                .put(api::entrypoint::update)
                .delete(api::entrypoint::delete),
        )
        .route(
            "/api/v1/organizations/{org_id}/tags",
            get(api::tag::list).post(api::tag::create),
        )
        .route(
            "/api/v1/organizations/{org_id}/tags/{id}",
            get(api::tag::get)
                .put(api::tag::update)
                .delete(api::tag::delete),
        )
        // Domain-scoped entities
        .route(
            "/api/v1/domains/{domain_id}/applications",
            get(api::application::list).post(api::application::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/applications/{id}",
            get(api::application::get)
                .put(api::application::update)
                .delete(api::application::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/identity-providers",
            get(api::identity_provider::list_in_domain)
                .post(api::identity_provider::create_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/identity-providers/{id}",
            get(api::identity_provider::get_in_domain)
                .put(api::identity_provider::update_in_domain)
                .delete(api::identity_provider::delete_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/certificates",
            get(api::certificate::list).post(api::certificate::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/certificates/{id}",
            get(api::certificate::get)
                .put(api::certificate::update)
                .delete(api::certificate::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/roles",
            get(api::role::list_in_domain).post(api::role::create_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/roles/{id}",
            get(api::role::get_in_domain)
                .put(api::role::update_in_domain)
                .delete(api::role::delete_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/scopes",
            get(api::scope::list).post(api::scope::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/scopes/{id}",
            get(api::scope::get)
                .put(api::scope::update)
                .delete(api::scope::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/groups",
            get(api::group::list_in_domain).post(api::group::create_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/groups/{id}",
            get(api::group::get_in_domain)
                .put(api::group::update_in_domain)
                .delete(api::group::delete_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/users",
            get(api::user::list_in_domain).post(api::user::create_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/users/{id}",
            get(api::user::get_in_domain)
                .put(api::user::update_in_domain)
                .delete(api::user::delete_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/users/{id}/reset-password",
            post(api::user::reset_password),
        )
        .route(
            "/api/v1/domains/{domain_id}/members",
            get(api::membership::list_in_domain).post(api::membership::create_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/members/{id}",
            get(api::membership::get_in_domain)
                .put(api::membership::update_in_domain)
                .delete(api::membership::delete_in_domain),
        )
        .route(
            "/api/v1/domains/{domain_id}/themes",
            get(api::theme::list).post(api::theme::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/themes/{id}",
            get(api::theme::get)
                .put(api::theme::update)
                .delete(api::theme::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/password-policies",
            get(api::password_policy::list).post(api::password_policy::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/password-policies/{id}",
            get(api::password_policy::get)
                .put(api::password_policy::update)
                .delete(api::password_policy::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/password-policies/{id}/default",
            put(api::password_policy::set_default),
        )
        .route(
            "/api/v1/domains/{domain_id}/flows",
            get(api::flow::list).post(api::flow::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/flows/{id}",
            get(api::flow::get)
                .put(api::flow::update)
                .delete(api::flow::delete),
        )
        // Authorization plane
        .route(
            "/api/v1/domains/{domain_id}/authorization-engines",
            get(api::authorization_engine::list).post(api::authorization_engine::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-engines/{id}",
            get(api::authorization_engine::get)
                .put(api::authorization_engine::update)
                .delete(api::authorization_engine::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/policy-sets",
            get(api::policy_set::list).post(api::policy_set::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/policy-sets/{id}",
            get(api::policy_set::get)
                .put(api::policy_set::update)
                .delete(api::policy_set::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/policy-sets/{id}/versions",
            get(api::policy_set::list_versions),
        )
        .route(
            "/api/v1/domains/{domain_id}/policy-sets/{id}/versions/{version}",
            get(api::policy_set::get_version),
        )
        .route(
            "/api/v1/domains/{domain_id}/policy-sets/{id}/versions/{version}/restore",
            post(api::policy_set::restore_version),
        )
        .route(
            "/api/v1/domains/{domain_id}/entity-stores",
            get(api::entity_store::list).post(api::entity_store::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/entity-stores/{id}",
            get(api::entity_store::get)
                .put(api::entity_store::update)
                .delete(api::entity_store::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/entity-stores/{id}/versions",
            get(api::entity_store::list_versions),
        )
        .route(
            "/api/v1/domains/{domain_id}/entity-stores/{id}/versions/{version}",
            get(api::entity_store::get_version),
        )
        .route(
            "/api/v1/domains/{domain_id}/entity-stores/{id}/versions/{version}/restore",
            post(api::entity_store::restore_version),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-schemas",
            get(api::authorization_schema::list).post(api::authorization_schema::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-schemas/{id}",
            get(api::authorization_schema::get)
                .put(api::authorization_schema::update)
                .delete(api::authorization_schema::delete),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-schemas/{id}/versions",
            get(api::authorization_schema::list_versions),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-schemas/{id}/versions/{version}",
            get(api::authorization_schema::get_version),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-schemas/{id}/versions/{version}/restore",
            post(api::authorization_schema::restore_version),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-bundles",
            get(api::authorization_bundle::list).post(api::authorization_bundle::create),
        )
        .route(
            "/api/v1/domains/{domain_id}/authorization-bundles/{id}",
            get(api::authorization_bundle::get).delete(api::authorization_bundle::delete),
        )
        // Audit trail
        .route("/api/v1/audit-logs", get(api::audit::list))
        .layer(ObservabilityLayer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
