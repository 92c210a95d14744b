//! Identity provider business logic

use crate::error::{AppError, Result};
use crate::model::{
    CreateIdentityProviderInput, IdentityProvider, Reference, UpdateIdentityProviderInput, UuidStr,
};
use crate::repository::IdentityProviderRepository;
use std::sync::Arc;
use validator::Validate;

pub struct IdentityProviderService<R: IdentityProviderRepository> {
    repo: Arc<R>,
}

impl<R: IdentityProviderRepository> IdentityProviderService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        reference: &Reference,
        input: CreateIdentityProviderInput,
    ) -> Result<IdentityProvider> {
        input.validate()?;
        self.repo.create(reference, &input).await
    }

    pub async fn get(&self, reference: &Reference, id: &UuidStr) -> Result<IdentityProvider> {
        let provider = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Identity provider {} not found", id)))?;

        if provider.reference() != *reference {
            return Err(AppError::BadRequest(format!(
                "Identity provider {} does not belong to this {}",
                id,
                reference.reference_type.to_string().to_lowercase()
            )));
        }

        Ok(provider)
    }

    pub async fn list(
        &self,
        reference: &Reference,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<IdentityProvider>, i64)> {
        let offset = (page - 1) * per_page;
        let providers = self
            .repo
            .list_by_reference(reference, offset, per_page)
            .await?;
        let total = self.repo.count_by_reference(reference).await?;
        Ok((providers, total))
    }

    pub async fn update(
        &self,
        reference: &Reference,
        id: &UuidStr,
        input: UpdateIdentityProviderInput,
    ) -> Result<IdentityProvider> {
        input.validate()?;
        let _ = self.get(reference, id).await?;
        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, reference: &Reference, id: &UuidStr) -> Result<()> {
        let _ = self.get(reference, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::identity_provider::MockIdentityProviderRepository;

    #[tokio::test]
    async fn test_get_rejects_foreign_reference() {
        let mut repo = MockIdentityProviderRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(IdentityProvider::default())));

        let svc = IdentityProviderService::new(Arc::new(repo));
        let reference = Reference::domain(UuidStr::new_v4());
        let err = svc.get(&reference, &UuidStr::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_validates_name() {
        let svc = IdentityProviderService::new(Arc::new(MockIdentityProviderRepository::new()));
        let reference = Reference::organization(UuidStr::new_v4());
        let input = CreateIdentityProviderInput {
            name: "".to_string(),
            provider_type: "oidc".to_string(),
            configuration: None,
            mappers: None,
            external: false,
        };

        let err = svc.create(&reference, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
