//! Domain business logic

use crate::error::{AppError, Result};
use crate::model::{CreateDomainInput, Domain, Reference, UpdateDomainInput, UuidStr};
use crate::repository::{
    ApplicationRepository, AuthorizationBundleRepository, AuthorizationEngineRepository,
    AuthorizationSchemaRepository, CertificateRepository, DomainRepository, EntityStoreRepository,
    FlowRepository, GroupRepository, IdentityProviderRepository, MembershipRepository,
    PasswordPolicyRepository, PolicySetRepository, RoleRepository, ScopeRepository,
    ThemeRepository, UserRepository,
};
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

pub struct DomainService<
    R: DomainRepository,
    AR: ApplicationRepository,
    IR: IdentityProviderRepository,
    CR: CertificateRepository,
    RR: RoleRepository,
    SR: ScopeRepository,
    GR: GroupRepository,
    UR: UserRepository,
    TR: ThemeRepository,
    PPR: PasswordPolicyRepository,
    FR: FlowRepository,
    MR: MembershipRepository,
    AER: AuthorizationEngineRepository,
    PSR: PolicySetRepository,
    ESR: EntityStoreRepository,
    ASR: AuthorizationSchemaRepository,
    ABR: AuthorizationBundleRepository,
> {
    repo: Arc<R>,
    application_repo: Arc<AR>,
    identity_provider_repo: Arc<IR>,
    certificate_repo: Arc<CR>,
    role_repo: Arc<RR>,
    scope_repo: Arc<SR>,
    group_repo: Arc<GR>,
    user_repo: Arc<UR>,
    theme_repo: Arc<TR>,
    password_policy_repo: Arc<PPR>,
    flow_repo: Arc<FR>,
    membership_repo: Arc<MR>,
    authorization_engine_repo: Arc<AER>,
    policy_set_repo: Arc<PSR>,
    entity_store_repo: Arc<ESR>,
    authorization_schema_repo: Arc<ASR>,
    authorization_bundle_repo: Arc<ABR>,
}

impl<
        R: DomainRepository,
        AR: ApplicationRepository,
        IR: IdentityProviderRepository,
        CR: CertificateRepository,
        RR: RoleRepository,
        SR: ScopeRepository,
        GR: GroupRepository,
        UR: UserRepository,
        TR: ThemeRepository,
        PPR: PasswordPolicyRepository,
        FR: FlowRepository,
        MR: MembershipRepository,
        AER: AuthorizationEngineRepository,
        PSR: PolicySetRepository,
        ESR: EntityStoreRepository,
        ASR: AuthorizationSchemaRepository,
        ABR: AuthorizationBundleRepository,
    > DomainService<R, AR, IR, CR, RR, SR, GR, UR, TR, PPR, FR, MR, AER, PSR, ESR, ASR, ABR>
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repo: Arc<R>,
        application_repo: Arc<AR>,
        identity_provider_repo: Arc<IR>,
        certificate_repo: Arc<CR>,
        role_repo: Arc<RR>,
        scope_repo: Arc<SR>,
        group_repo: Arc<GR>,
        user_repo: Arc<UR>,
        theme_repo: Arc<TR>,
        password_policy_repo: Arc<PPR>,
        flow_repo: Arc<FR>,
        membership_repo: Arc<MR>,
        authorization_engine_repo: Arc<AER>,
        policy_set_repo: Arc<PSR>,
        entity_store_repo: Arc<ESR>,
        authorization_schema_repo: Arc<ASR>,
        authorization_bundle_repo: Arc<ABR>,
    ) -> Self {
        Self {
            repo,
            application_repo,
            identity_provider_repo,
            certificate_repo,
            role_repo,
            scope_repo,
            group_repo,
            user_repo,
            theme_repo,
            password_policy_repo,
            flow_repo,
            membership_repo,
            authorization_engine_repo,
            policy_set_repo,
            entity_store_repo,
            authorization_schema_repo,
            authorization_bundle_repo,
        }
    }

    pub async fn create(
        &self,
        organization_id: &UuidStr,
        input: CreateDomainInput,
    ) -> Result<Domain> {
        input.validate()?;

        if self
            .repo
            .find_by_hrid(organization_id, &input.hrid)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Domain with hrid '{}' already exists in this organization",
                input.hrid
            )));
        }

        self.repo.create(organization_id, &input).await
    }

    pub async fn get(&self, id: &UuidStr) -> Result<Domain> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Domain {} not found", id)))
    }

    /// Fetch a domain nested under an organization path; a domain owned by a
    /// different organization is a bad request, not a 404.
    pub async fn get_in_organization(
        &self,
        organization_id: &UuidStr,
        id: &UuidStr,
    ) -> Result<Domain> {
        let domain = self.get(id).await?;
        if domain.organization_id != *organization_id {
            return Err(AppError::BadRequest(format!(
                "Domain {} does not belong to organization {}",
                id, organization_id
            )));
        }
        Ok(domain)
    }

    pub async fn list(
        &self,
        organization_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Domain>, i64)> {
        let offset = (page - 1) * per_page;
        let domains = self
            .repo
            .list_by_organization(organization_id, offset, per_page)
            .await?;
        let total = self.repo.count_by_organization(organization_id).await?;
        Ok((domains, total))
    }

    pub async fn update(&self, id: &UuidStr, input: UpdateDomainInput) -> Result<Domain> {
        input.validate()?;
        let _ = self.get(id).await?;
        self.repo.update(id, &input).await
    }

    /// Delete a domain and everything it owns.
    pub async fn delete(&self, id: &UuidStr) -> Result<()> {
        let _ = self.get(id).await?;
        let reference = Reference::domain(id.clone());

        let deleted = self.authorization_bundle_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted authorization bundles");

        let deleted = self.policy_set_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted policy sets");

        let deleted = self.entity_store_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted entity stores");

        let deleted = self.authorization_schema_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted authorization schemas");

        let deleted = self.authorization_engine_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted authorization engines");

        let deleted = self.application_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted applications");

        let deleted = self
            .identity_provider_repo
            .delete_by_reference(&reference)
            .await?;
        warn!(domain_id = %id, deleted, "Deleted identity providers");

        let deleted = self.certificate_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted certificates");

        let deleted = self.scope_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted scopes");

        let deleted = self.membership_repo.delete_by_reference(&reference).await?;
        warn!(domain_id = %id, deleted, "Deleted memberships");

        let deleted = self.role_repo.delete_by_reference(&reference).await?;
        warn!(domain_id = %id, deleted, "Deleted roles");

        let deleted = self.group_repo.delete_by_reference(&reference).await?;
        warn!(domain_id = %id, deleted, "Deleted groups");

        let deleted = self.user_repo.delete_by_reference(&reference).await?;
        warn!(domain_id = %id, deleted, "Deleted users");

        let deleted = self.theme_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted themes");

        let deleted = self.password_policy_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted password policies");

        let deleted = self.flow_repo.delete_by_domain(id).await?;
        warn!(domain_id = %id, deleted, "Deleted flows");

        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::application::MockApplicationRepository;
    use crate::repository::authorization_bundle::MockAuthorizationBundleRepository;
    use crate::repository::authorization_engine::MockAuthorizationEngineRepository;
    use crate::repository::authorization_schema::MockAuthorizationSchemaRepository;
    use crate::repository::certificate::MockCertificateRepository;
    use crate::repository::domain::MockDomainRepository;
    use crate::repository::entity_store::MockEntityStoreRepository;
    use crate::repository::flow::MockFlowRepository;
    use crate::repository::group::MockGroupRepository;
    use crate::repository::identity_provider::MockIdentityProviderRepository;
    use crate::repository::membership::MockMembershipRepository;
    use crate::repository::password_policy::MockPasswordPolicyRepository;
    use crate::repository::policy_set::MockPolicySetRepository;
    use crate::repository::role::MockRoleRepository;
    use crate::repository::scope::MockScopeRepository;
    use crate::repository::theme::MockThemeRepository;
    use crate::repository::user::MockUserRepository;

    type TestService = DomainService<
        MockDomainRepository,
        MockApplicationRepository,
        MockIdentityProviderRepository,
        MockCertificateRepository,
        MockRoleRepository,
        MockScopeRepository,
        MockGroupRepository,
        MockUserRepository,
        MockThemeRepository,
        MockPasswordPolicyRepository,
        MockFlowRepository,
        MockMembershipRepository,
        MockAuthorizationEngineRepository,
        MockPolicySetRepository,
        MockEntityStoreRepository,
        MockAuthorizationSchemaRepository,
        MockAuthorizationBundleRepository,
    >;

    fn service(repo: MockDomainRepository) -> TestService {
        DomainService::new(
            Arc::new(repo),
            Arc::new(MockApplicationRepository::new()),
            Arc::new(MockIdentityProviderRepository::new()),
            Arc::new(MockCertificateRepository::new()),
            Arc::new(MockRoleRepository::new()),
            Arc::new(MockScopeRepository::new()),
            Arc::new(MockGroupRepository::new()),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockThemeRepository::new()),
            Arc::new(MockPasswordPolicyRepository::new()),
            Arc::new(MockFlowRepository::new()),
            Arc::new(MockMembershipRepository::new()),
            Arc::new(MockAuthorizationEngineRepository::new()),
            Arc::new(MockPolicySetRepository::new()),
            Arc::new(MockEntityStoreRepository::new()),
            Arc::new(MockAuthorizationSchemaRepository::new()),
            Arc::new(MockAuthorizationBundleRepository::new()),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_hrid() {
        let mut repo = MockDomainRepository::new();
        repo.expect_find_by_hrid()
            .returning(|_, _| Ok(Some(Domain::default())));

        let svc = service(repo);
        let input = CreateDomainInput {
            name: "Payments".to_string(),
            hrid: "payments".to_string(),
            description: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_hrid() {
        let svc = service(MockDomainRepository::new());
        let input = CreateDomainInput {
            name: "Payments".to_string(),
            hrid: "Not A Hrid".to_string(),
            description: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_in_organization_rejects_foreign_domain() {
        let foreign_org = UuidStr::new_v4();
        let mut repo = MockDomainRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Domain::default())));

        let svc = service(repo);
        let err = svc
            .get_in_organization(&foreign_org, &UuidStr::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_cascades_children() {
        let domain_id = UuidStr::new_v4();
        let mut repo = MockDomainRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Domain::default())));
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let mut application_repo = MockApplicationRepository::new();
        application_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(2));
        let mut identity_provider_repo = MockIdentityProviderRepository::new();
        identity_provider_repo
            .expect_delete_by_reference()
            .times(1)
            .returning(|_| Ok(1));
        let mut certificate_repo = MockCertificateRepository::new();
        certificate_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut role_repo = MockRoleRepository::new();
        role_repo
            .expect_delete_by_reference()
            .times(1)
            .returning(|_| Ok(4));
        let mut scope_repo = MockScopeRepository::new();
        scope_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(3));
        let mut group_repo = MockGroupRepository::new();
        group_repo
            .expect_delete_by_reference()
            .times(1)
            .returning(|_| Ok(1));
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_delete_by_reference()
            .times(1)
            .returning(|_| Ok(10));
        let mut theme_repo = MockThemeRepository::new();
        theme_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut password_policy_repo = MockPasswordPolicyRepository::new();
        password_policy_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut flow_repo = MockFlowRepository::new();
        flow_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(2));
        let mut membership_repo = MockMembershipRepository::new();
        membership_repo
            .expect_delete_by_reference()
            .times(1)
            .returning(|_| Ok(5));
        let mut authorization_engine_repo = MockAuthorizationEngineRepository::new();
        authorization_engine_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut policy_set_repo = MockPolicySetRepository::new();
        policy_set_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut entity_store_repo = MockEntityStoreRepository::new();
        entity_store_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut authorization_schema_repo = MockAuthorizationSchemaRepository::new();
        authorization_schema_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));
        let mut authorization_bundle_repo = MockAuthorizationBundleRepository::new();
        authorization_bundle_repo
            .expect_delete_by_domain()
            .times(1)
            .returning(|_| Ok(1));

        let svc = DomainService::new(
            Arc::new(repo),
            Arc::new(application_repo),
            Arc::new(identity_provider_repo),
            Arc::new(certificate_repo),
            Arc::new(role_repo),
            Arc::new(scope_repo),
            Arc::new(group_repo),
            Arc::new(user_repo),
            Arc::new(theme_repo),
            Arc::new(password_policy_repo),
            Arc::new(flow_repo),
            Arc::new(membership_repo),
            Arc::new(authorization_engine_repo),
            Arc::new(policy_set_repo),
            Arc::new(entity_store_repo),
            Arc::new(authorization_schema_repo),
            Arc::new(authorization_bundle_repo),
        );

        assert!(svc.delete(&domain_id).await.is_ok());
    }
}
