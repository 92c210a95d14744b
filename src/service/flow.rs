//! Flow business logic

use crate::error::{AppError, Result};
use crate::model::{CreateFlowInput, Flow, UpdateFlowInput, UuidStr};
use crate::repository::FlowRepository;
use std::sync::Arc;
use validator::Validate;

pub struct FlowService<R: FlowRepository> {
    repo: Arc<R>,
}

impl<R: FlowRepository> FlowService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, domain_id: &UuidStr, input: CreateFlowInput) -> Result<Flow> {
        input.validate()?;
        self.repo.create(domain_id, &input).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<Flow> {
        let flow = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Flow {} not found", id)))?;

        if flow.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Flow {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(flow)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Flow>, i64)> {
        let offset = (page - 1) * per_page;
        let flows = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((flows, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateFlowInput,
    ) -> Result<Flow> {
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
    use crate::model::FlowType;
    use crate::repository::flow::MockFlowRepository;

    #[tokio::test]
    async fn test_create_passes_through() {
        let mut repo = MockFlowRepository::new();
        repo.expect_create().returning(|_, input| {
            Ok(Flow {
                name: input.name.clone(),
                flow_type: input.flow_type,
                ..Default::default()
            })
        });

        let svc = FlowService::new(Arc::new(repo));
        let input = CreateFlowInput {
            name: "login flow".to_string(),
            flow_type: FlowType::Login,
            pre_steps: None,
            post_steps: None,
            position: 0,
        };

        let flow = svc.create(&UuidStr::new_v4(), input).await.unwrap();
        assert_eq!(flow.flow_type, FlowType::Login);
    }

    #[tokio::test]
    async fn test_get_rejects_foreign_domain() {
        let mut repo = MockFlowRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Flow::default())));

        let svc = FlowService::new(Arc::new(repo));
        let err = svc
            .get(&UuidStr::new_v4(), &UuidStr::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
