//! Authorization bundle business logic
//!
//! Bundles are immutable snapshots: once created they can only be listed,
//! fetched, and deleted. Each pinned component must live in the same domain
//! and the pinned version must actually exist.

use crate::error::{AppError, Result};
use crate::model::{AuthorizationBundle, CreateAuthorizationBundleInput, UuidStr};
use crate::repository::{
    AuthorizationBundleRepository, AuthorizationSchemaRepository, EntityStoreRepository,
    PolicySetRepository,
};
use std::sync::Arc;
use validator::Validate;

pub struct AuthorizationBundleService<R, PSR, ESR, ASR>
where
    R: AuthorizationBundleRepository,
    PSR: PolicySetRepository,
    ESR: EntityStoreRepository,
    ASR: AuthorizationSchemaRepository,
{
    repo: Arc<R>,
    policy_set_repo: Arc<PSR>,
    entity_store_repo: Arc<ESR>,
    schema_repo: Arc<ASR>,
}

impl<R, PSR, ESR, ASR> AuthorizationBundleService<R, PSR, ESR, ASR>
where
    R: AuthorizationBundleRepository,
    PSR: PolicySetRepository,
    ESR: EntityStoreRepository,
    ASR: AuthorizationSchemaRepository,
{
    pub fn new(
        repo: Arc<R>,
        policy_set_repo: Arc<PSR>,
        entity_store_repo: Arc<ESR>,
        schema_repo: Arc<ASR>,
    ) -> Self {
        Self {
            repo,
            policy_set_repo,
            entity_store_repo,
            schema_repo,
        }
    }

    /// Resolves the version to pin: the requested one when given, otherwise
    /// the component's head. Either way it must exist.
    fn resolve_version(
        kind: &str,
        id: &UuidStr,
        latest: i64,
        requested: Option<i64>,
    ) -> Result<i64> {
        let version = requested.unwrap_or(latest);
        if version < 1 || version > latest {
            return Err(AppError::BadRequest(format!(
                "{} {} has no version {}",
                kind, id, version
            )));
        }
        Ok(version)
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreateAuthorizationBundleInput,
        created_by: Option<&str>,
    ) -> Result<AuthorizationBundle> {
        input.validate()?;

        let policy_set = self
            .policy_set_repo
            .find_by_id(&input.policy_set_id)
            .await?
            .filter(|s| s.domain_id == *domain_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Policy set {} not found in domain {}",
                    input.policy_set_id, domain_id
                ))
            })?;
        let entity_store = self
            .entity_store_repo
            .find_by_id(&input.entity_store_id)
            .await?
            .filter(|s| s.domain_id == *domain_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Entity store {} not found in domain {}",
                    input.entity_store_id, domain_id
                ))
            })?;
        let schema = self
            .schema_repo
            .find_by_id(&input.schema_id)
            .await?
            .filter(|s| s.domain_id == *domain_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Schema {} not found in domain {}",
                    input.schema_id, domain_id
                ))
            })?;

        let bundle = AuthorizationBundle {
            id: UuidStr::new_v4(),
            domain_id: *domain_id,
            name: input.name,
            policy_set_id: policy_set.id,
            policy_set_version: Self::resolve_version(
                "Policy set",
                &policy_set.id,
                policy_set.latest_version,
                input.policy_set_version,
            )?,
            entity_store_id: entity_store.id,
            entity_store_version: Self::resolve_version(
                "Entity store",
                &entity_store.id,
                entity_store.latest_version,
                input.entity_store_version,
            )?,
            schema_id: schema.id,
            schema_version: Self::resolve_version(
                "Schema",
                &schema.id,
                schema.latest_version,
                input.schema_version,
            )?,
            created_by: created_by.map(str::to_string),
            ..Default::default()
        };

        self.repo.create(&bundle).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<AuthorizationBundle> {
        let bundle = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bundle {} not found", id)))?;

        if bundle.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Bundle {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(bundle)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AuthorizationBundle>, i64)> {
        let offset = (page - 1) * per_page;
        let bundles = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((bundles, total))
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuthorizationSchema, EntityStore, PolicySet};
    use crate::repository::authorization_bundle::MockAuthorizationBundleRepository;
    use crate::repository::authorization_schema::MockAuthorizationSchemaRepository;
    use crate::repository::entity_store::MockEntityStoreRepository;
    use crate::repository::policy_set::MockPolicySetRepository;

    fn components(
        domain_id: UuidStr,
        latest: i64,
    ) -> (
        MockPolicySetRepository,
        MockEntityStoreRepository,
        MockAuthorizationSchemaRepository,
    ) {
        let mut ps = MockPolicySetRepository::new();
        ps.expect_find_by_id().returning(move |id| {
            Ok(Some(PolicySet {
                id: *id,
                domain_id,
                latest_version: latest,
                ..Default::default()
            }))
        });
        let mut es = MockEntityStoreRepository::new();
        es.expect_find_by_id().returning(move |id| {
            Ok(Some(EntityStore {
                id: *id,
                domain_id,
                latest_version: latest,
                ..Default::default()
            }))
        });
        let mut sc = MockAuthorizationSchemaRepository::new();
        sc.expect_find_by_id().returning(move |id| {
            Ok(Some(AuthorizationSchema {
                id: *id,
                domain_id,
                latest_version: latest,
                ..Default::default()
            }))
        });
        (ps, es, sc)
    }

    fn input() -> CreateAuthorizationBundleInput {
        CreateAuthorizationBundleInput {
            name: "prod".to_string(),
            policy_set_id: UuidStr::new_v4(),
            policy_set_version: None,
            entity_store_id: UuidStr::new_v4(),
            entity_store_version: None,
            schema_id: UuidStr::new_v4(),
            schema_version: None,
        }
    }

    #[tokio::test]
    async fn test_create_pins_latest_versions_by_default() {
        let domain_id = UuidStr::new_v4();
        let (ps, es, sc) = components(domain_id, 3);
        let mut repo = MockAuthorizationBundleRepository::new();
        repo.expect_create().returning(|bundle| Ok(bundle.clone()));

        let svc = AuthorizationBundleService::new(
            Arc::new(repo),
            Arc::new(ps),
            Arc::new(es),
            Arc::new(sc),
        );

        let bundle = svc
            .create(&domain_id, input(), Some("ops@acme.io"))
            .await
            .unwrap();
        assert_eq!(bundle.policy_set_version, 3);
        assert_eq!(bundle.entity_store_version, 3);
        assert_eq!(bundle.schema_version, 3);
        assert_eq!(bundle.created_by.as_deref(), Some("ops@acme.io"));
    }

    #[tokio::test]
    async fn test_create_rejects_component_without_content() {
        let domain_id = UuidStr::new_v4();
        let (ps, es, sc) = components(domain_id, 0);

        let svc = AuthorizationBundleService::new(
            Arc::new(MockAuthorizationBundleRepository::new()),
            Arc::new(ps),
            Arc::new(es),
            Arc::new(sc),
        );

        let err = svc.create(&domain_id, input(), None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_missing_pinned_version() {
        let domain_id = UuidStr::new_v4();
        let (ps, es, sc) = components(domain_id, 2);

        let svc = AuthorizationBundleService::new(
            Arc::new(MockAuthorizationBundleRepository::new()),
            Arc::new(ps),
            Arc::new(es),
            Arc::new(sc),
        );

        let mut input = input();
        input.policy_set_version = Some(5);
        let err = svc.create(&domain_id, input, None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_component_from_other_domain() {
        let domain_id = UuidStr::new_v4();
        let (ps, es, sc) = components(UuidStr::new_v4(), 1);

        let svc = AuthorizationBundleService::new(
            Arc::new(MockAuthorizationBundleRepository::new()),
            Arc::new(ps),
            Arc::new(es),
            Arc::new(sc),
        );

        let err = svc.create(&domain_id, input(), None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
