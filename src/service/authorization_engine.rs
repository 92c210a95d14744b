//! Authorization engine business logic

use crate::error::{AppError, Result};
use crate::model::{
    AuthorizationEngine, CreateAuthorizationEngineInput, UpdateAuthorizationEngineInput, UuidStr,
};
use crate::repository::AuthorizationEngineRepository;
use std::sync::Arc;
use validator::Validate;

pub struct AuthorizationEngineService<R: AuthorizationEngineRepository> {
    repo: Arc<R>,
}

impl<R: AuthorizationEngineRepository> AuthorizationEngineService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreateAuthorizationEngineInput,
    ) -> Result<AuthorizationEngine> {
        input.validate()?;
        self.repo.create(domain_id, &input).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<AuthorizationEngine> {
        let engine = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Authorization engine {} not found", id)))?;

        if engine.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Authorization engine {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(engine)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AuthorizationEngine>, i64)> {
        let offset = (page - 1) * per_page;
        let engines = self
            .repo
            .list_by_domain(domain_id, offset, per_page)
            .await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((engines, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateAuthorizationEngineInput,
    ) -> Result<AuthorizationEngine> {
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
    use crate::model::EngineType;
    use crate::repository::authorization_engine::MockAuthorizationEngineRepository;

    #[tokio::test]
    async fn test_create_defaults_to_cedar() {
        let mut repo = MockAuthorizationEngineRepository::new();
        repo.expect_create().returning(|_, input| {
            Ok(AuthorizationEngine {
                name: input.name.clone(),
                engine_type: input.engine_type,
                endpoint_url: input.endpoint_url.clone(),
                ..Default::default()
            })
        });

        let svc = AuthorizationEngineService::new(Arc::new(repo));
        let input: CreateAuthorizationEngineInput = serde_json::from_value(serde_json::json!({
            "name": "main",
            "endpoint_url": "http://localhost:8181"
        }))
        .unwrap();

        let engine = svc.create(&UuidStr::new_v4(), input).await.unwrap();
        assert_eq!(engine.engine_type, EngineType::Cedar);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_endpoint() {
        let svc =
            AuthorizationEngineService::new(Arc::new(MockAuthorizationEngineRepository::new()));
        let input = CreateAuthorizationEngineInput {
            name: "main".to_string(),
            engine_type: EngineType::Cedar,
            endpoint_url: "not a url".to_string(),
            configuration: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
