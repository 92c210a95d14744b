//! Organization business logic

use crate::error::{AppError, Result};
use crate::model::{CreateOrganizationInput, Organization, UpdateOrganizationInput, UuidStr};
use crate::repository::{DomainRepository, OrganizationRepository};
use std::sync::Arc;
use validator::Validate;

pub struct OrganizationService<R: OrganizationRepository, DR: DomainRepository> {
    repo: Arc<R>,
    domain_repo: Arc<DR>,
}

impl<R: OrganizationRepository, DR: DomainRepository> OrganizationService<R, DR> {
    pub fn new(repo: Arc<R>, domain_repo: Arc<DR>) -> Self {
        Self { repo, domain_repo }
    }

    pub async fn create(&self, input: CreateOrganizationInput) -> Result<Organization> {
        input.validate()?;

        if let Some(hrids) = &input.hrids {
            for hrid in hrids {
                if self.repo.find_by_hrid(hrid).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Organization with hrid '{}' already exists",
                        hrid
                    )));
                }
            }
        }

        self.repo.create(&input).await
    }

    pub async fn get(&self, id: &UuidStr) -> Result<Organization> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Organization {} not found", id)))
    }

    pub async fn list(&self, page: i64, per_page: i64) -> Result<(Vec<Organization>, i64)> {
        let offset = (page - 1) * per_page;
        let organizations = self.repo.list(offset, per_page).await?;
        let total = self.repo.count().await?;
        Ok((organizations, total))
    }

    pub async fn update(
        &self,
        id: &UuidStr,
        input: UpdateOrganizationInput,
    ) -> Result<Organization> {
        input.validate()?;

        let existing = self.get(id).await?;

        if let Some(hrids) = &input.hrids {
            for hrid in hrids {
                if existing.hrids.contains(hrid) {
                    continue;
                }
                if self.repo.find_by_hrid(hrid).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Organization with hrid '{}' already exists",
                        hrid
                    )));
                }
            }
        }

        self.repo.update(id, &input).await
    }

    /// Deletion is refused while the organization still owns domains; callers
    /// must delete domains first so their cascades run.
    pub async fn delete(&self, id: &UuidStr) -> Result<()> {
        let _ = self.get(id).await?;

        let domains = self.domain_repo.count_by_organization(id).await?;
        if domains > 0 {
            return Err(AppError::Conflict(format!(
                "Organization {} still owns {} domain(s)",
                id, domains
            )));
        }

        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::domain::MockDomainRepository;
    use crate::repository::organization::MockOrganizationRepository;

    fn service(
        repo: MockOrganizationRepository,
        domain_repo: MockDomainRepository,
    ) -> OrganizationService<MockOrganizationRepository, MockDomainRepository> {
        OrganizationService::new(Arc::new(repo), Arc::new(domain_repo))
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_hrid() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_hrid()
            .returning(|_| Ok(Some(Organization::default())));

        let svc = service(repo, MockDomainRepository::new());
        let input = CreateOrganizationInput {
            name: "Acme".to_string(),
            description: None,
            hrids: Some(vec!["acme".to_string()]),
        };

        let err = svc.create(input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_succeeds() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_hrid().returning(|_| Ok(None));
        repo.expect_create().returning(|input| {
            Ok(Organization {
                name: input.name.clone(),
                ..Default::default()
            })
        });

        let svc = service(repo, MockDomainRepository::new());
        let input = CreateOrganizationInput {
            name: "Acme".to_string(),
            description: None,
            hrids: Some(vec!["acme".to_string()]),
        };

        let organization = svc.create(input).await.unwrap();
        assert_eq!(organization.name, "Acme");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let svc = service(repo, MockDomainRepository::new());
        let err = svc.get(&UuidStr::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_refused_while_domains_remain() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Organization::default())));
        let mut domain_repo = MockDomainRepository::new();
        domain_repo
            .expect_count_by_organization()
            .returning(|_| Ok(3));

        let svc = service(repo, domain_repo);
        let err = svc.delete(&UuidStr::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_empty_organization() {
        let mut repo = MockOrganizationRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Organization::default())));
        repo.expect_delete().returning(|_| Ok(()));
        let mut domain_repo = MockDomainRepository::new();
        domain_repo
            .expect_count_by_organization()
            .returning(|_| Ok(0));

        let svc = service(repo, domain_repo);
        assert!(svc.delete(&UuidStr::new_v4()).await.is_ok());
    }
}
