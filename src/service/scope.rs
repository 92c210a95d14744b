//! OAuth2 scope business logic

use crate::error::{AppError, Result};
use crate::model::{CreateScopeInput, Scope, UpdateScopeInput, UuidStr};
use crate::repository::ScopeRepository;
use std::sync::Arc;
use validator::Validate;

pub struct ScopeService<R: ScopeRepository> {
    repo: Arc<R>,
}

impl<R: ScopeRepository> ScopeService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, domain_id: &UuidStr, input: CreateScopeInput) -> Result<Scope> {
        input.validate()?;

        if self.repo.find_by_key(domain_id, &input.key).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Scope '{}' already exists in this domain",
                input.key
            )));
        }

        self.repo.create(domain_id, &input).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<Scope> {
        let scope = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Scope {} not found", id)))?;

        if scope.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Scope {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(scope)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Scope>, i64)> {
        let offset = (page - 1) * per_page;
        let scopes = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((scopes, total))
    }

    /// The scope key is immutable; only metadata can change.
    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateScopeInput,
    ) -> Result<Scope> {
        input.validate()?;
        let _ = self.get(domain_id, id).await?;
        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::scope::MockScopeRepository;

    #[tokio::test]
    async fn test_create_rejects_duplicate_key() {
        let mut repo = MockScopeRepository::new();
        repo.expect_find_by_key()
            .returning(|_, _| Ok(Some(Scope::default())));

        let svc = ScopeService::new(Arc::new(repo));
        let input = CreateScopeInput {
            key: "openid".to_string(),
            name: "OpenID".to_string(),
            description: None,
            discovery: true,
            expires_in: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_key() {
        let svc = ScopeService::new(Arc::new(MockScopeRepository::new()));
        let input = CreateScopeInput {
            key: "Not Valid".to_string(),
            name: "Invalid".to_string(),
            description: None,
            discovery: false,
            expires_in: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
