//! Entrypoint business logic

use crate::error::{AppError, Result};
use crate::model::{CreateEntrypointInput, Entrypoint, UpdateEntrypointInput, UuidStr};
use crate::repository::EntrypointRepository;
use std::sync::Arc;
use validator::Validate;

pub struct EntrypointService<R: EntrypointRepository> {
    repo: Arc<R>,
}

impl<R: EntrypointRepository> EntrypointService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        organization_id: &UuidStr,
        input: CreateEntrypointInput,
    ) -> Result<Entrypoint> {
        input.validate()?;
        self.repo.create(organization_id, &input).await
    }

    pub async fn get(&self, organization_id: &UuidStr, id: &UuidStr) -> Result<Entrypoint> {
        let entrypoint = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entrypoint {} not found", id)))?;

        if entrypoint.organization_id != *organization_id {
            return Err(AppError::BadRequest(format!(
                "Entrypoint {} does not belong to organization {}",
                id, organization_id
            )));
        }

        Ok(entrypoint)
    }

    pub async fn list(
        &self,
        organization_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Entrypoint>, i64)> {
        let offset = (page - 1) * per_page;
        let entrypoints = self
            .repo
            .list_by_organization(organization_id, offset, per_page)
            .await?;
        let total = self.repo.count_by_organization(organization_id).await?;
        Ok((entrypoints, total))
    }

    pub async fn update(
        &self,
        organization_id: &UuidStr,
        id: &UuidStr,
        input: UpdateEntrypointInput,
    ) -> Result<Entrypoint> {
        input.validate()?;
        let _ = self.get(organization_id, id).await?;
        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, organization_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let entrypoint = self.get(organization_id, id).await?;
        if entrypoint.default_entrypoint {
            return Err(AppError::BadRequest(
                "Default entrypoints cannot be deleted".to_string(),
            ));
        }
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::entrypoint::MockEntrypointRepository;

    #[tokio::test]
    async fn test_delete_refuses_default_entrypoint() {
        let organization_id = UuidStr::new_v4();
        let entrypoint = Entrypoint {
            organization_id,
            default_entrypoint: true,
            ..Default::default()
        };
        let mut repo = MockEntrypointRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(entrypoint.clone())));

        let svc = EntrypointService::new(Arc::new(repo));
        let err = svc
            .delete(&organization_id, &UuidStr::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
