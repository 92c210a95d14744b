//! Policy set business logic
//!
//! Content changes never overwrite anything: each one appends an immutable
//! version row and moves the head. Restoring an old version re-emits its
//! content as a new head version, so the history stays linear.

use crate::error::{AppError, Result};
use crate::model::{
    CreatePolicySetInput, PolicySet, PolicySetVersion, UpdatePolicySetInput, UuidStr,
};
use crate::repository::PolicySetRepository;
use std::sync::Arc;
use validator::Validate;

pub struct PolicySetService<R: PolicySetRepository> {
    repo: Arc<R>,
}

impl<R: PolicySetRepository> PolicySetService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreatePolicySetInput,
        created_by: Option<&str>,
    ) -> Result<PolicySet> {
        input.validate()?;

        if self
            .repo
            .find_by_name(domain_id, &input.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Policy set '{}' already exists in this domain",
                input.name
            )));
        }

        let set = self
            .repo
            .create(domain_id, &input.name, input.description.as_deref())
            .await?;

        if let Some(content) = &input.content {
            self.repo.append_version(&set.id, content, created_by).await?;
            return self.get(domain_id, &set.id).await;
        }

        Ok(set)
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<PolicySet> {
        let set = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Policy set {} not found", id)))?;

        if set.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Policy set {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(set)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<PolicySet>, i64)> {
        let offset = (page - 1) * per_page;
        let sets = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((sets, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdatePolicySetInput,
        created_by: Option<&str>,
    ) -> Result<PolicySet> {
        input.validate()?;
        let existing = self.get(domain_id, id).await?;

        if let Some(name) = &input.name {
            if *name != existing.name {
                if self.repo.find_by_name(domain_id, name).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Policy set '{}' already exists in this domain",
                        name
                    )));
                }
            }
        }

        if input.name.is_some() || input.description.is_some() {
            self.repo
                .update_meta(id, input.name.as_deref(), input.description.as_deref())
                .await?;
        }

        if let Some(content) = &input.content {
            self.repo.append_version(id, content, created_by).await?;
        }

        self.get(domain_id, id).await
    }

    pub async fn list_versions(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<PolicySetVersion>, i64)> {
        let _ = self.get(domain_id, id).await?;
        let offset = (page - 1) * per_page;
        let versions = self.repo.list_versions(id, offset, per_page).await?;
        let total = self.repo.count_versions(id).await?;
        Ok((versions, total))
    }

    pub async fn get_version(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        version: i64,
    ) -> Result<PolicySetVersion> {
        let _ = self.get(domain_id, id).await?;
        self.repo.find_version(id, version).await?.ok_or_else(|| {
            AppError::NotFound(format!("Policy set {} has no version {}", id, version))
        })
    }

    /// Copies an old version's content into a fresh head version.
    pub async fn restore_version(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        version: i64,
        created_by: Option<&str>,
    ) -> Result<PolicySetVersion> {
        let old = self.get_version(domain_id, id, version).await?;
        self.repo.append_version(id, &old.content, created_by).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::policy_set::MockPolicySetRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_create_with_content_appends_first_version() {
        let domain_id = UuidStr::new_v4();
        let mut repo = MockPolicySetRepository::new();
        repo.expect_find_by_name().returning(|_, _| Ok(None));

        let set = PolicySet {
            domain_id,
            name: "default".to_string(),
            ..Default::default()
        };
        let set_id = set.id;
        let created = set.clone();
        repo.expect_create()
            .returning(move |_, _, _| Ok(created.clone()));
        repo.expect_append_version()
            .withf(move |id, content, _| *id == set_id && content == "permit(...);")
            .returning(|id, content, _| {
                Ok(PolicySetVersion {
                    policy_set_id: *id,
                    version: 1,
                    content: content.to_string(),
                    ..Default::default()
                })
            });
        repo.expect_find_by_id().returning(move |_| {
            Ok(Some(PolicySet {
                latest_version: 1,
                ..set.clone()
            }))
        });

        let svc = PolicySetService::new(Arc::new(repo));
        let input = CreatePolicySetInput {
            name: "default".to_string(),
            description: None,
            content: Some("permit(...);".to_string()),
        };

        let set = svc.create(&domain_id, input, Some("ops@acme.io")).await.unwrap();
        assert_eq!(set.latest_version, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut repo = MockPolicySetRepository::new();
        repo.expect_find_by_name()
            .returning(|_, _| Ok(Some(PolicySet::default())));

        let svc = PolicySetService::new(Arc::new(repo));
        let input = CreatePolicySetInput {
            name: "default".to_string(),
            description: None,
            content: None,
        };

        let err = svc
            .create(&UuidStr::new_v4(), input, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_restore_version_appends_old_content() {
        let domain_id = UuidStr::new_v4();
        let set = PolicySet {
            domain_id,
            latest_version: 3,
            ..Default::default()
        };
        let set_id = set.id;

        let mut repo = MockPolicySetRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(set.clone())));
        repo.expect_find_version()
            .with(eq(set_id), eq(2))
            .returning(|id, version| {
                Ok(Some(PolicySetVersion {
                    policy_set_id: *id,
                    version,
                    content: "forbid(...);".to_string(),
                    ..Default::default()
                }))
            });
        repo.expect_append_version()
            .withf(|_, content, _| content == "forbid(...);")
            .returning(|id, content, _| {
                Ok(PolicySetVersion {
                    policy_set_id: *id,
                    version: 4,
                    content: content.to_string(),
                    ..Default::default()
                })
            });

        let svc = PolicySetService::new(Arc::new(repo));
        let restored = svc
            .restore_version(&domain_id, &set_id, 2, None)
            .await
            .unwrap();
        assert_eq!(restored.version, 4);
        assert_eq!(restored.content, "forbid(...);");
    }

    #[tokio::test]
    async fn test_get_version_unknown_is_not_found() {
        let domain_id = UuidStr::new_v4();
        let set = PolicySet {
            domain_id,
            ..Default::default()
        };
        let set_id = set.id;

        let mut repo = MockPolicySetRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(set.clone())));
        repo.expect_find_version().returning(|_, _| Ok(None));

        let svc = PolicySetService::new(Arc::new(repo));
        let err = svc.get_version(&domain_id, &set_id, 9).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
