//! Audit trail business logic
//!
//! Audit records are written on a best-effort basis: a failed write is logged
//! and never fails the request that produced it.

use crate::error::Result;
use crate::model::{AuditLog, AuditLogQuery, CreateAuditLogInput};
use crate::repository::AuditRepository;
use std::sync::Arc;
use tracing::error;

pub struct AuditService<R: AuditRepository> {
    repo: Arc<R>,
}

impl<R: AuditRepository> AuditService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, input: CreateAuditLogInput) {
        if let Err(err) = self.repo.create(&input).await {
            error!(
                action = %input.action,
                resource_type = %input.resource_type,
                %err,
                "Failed to write audit log"
            );
        }
    }

    pub async fn list(
        &self,
        mut query: AuditLogQuery,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AuditLog>, i64)> {
        query.offset = Some((page - 1) * per_page);
        query.limit = Some(per_page);
        let logs = self.repo.find(&query).await?;
        let total = self.repo.count(&query).await?;
        Ok((logs, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::audit::MockAuditRepository;

    #[tokio::test]
    async fn test_record_swallows_repository_errors() {
        let mut repo = MockAuditRepository::new();
        repo.expect_create()
            .returning(|_| Err(crate::error::AppError::Database(sqlx::Error::PoolClosed)));

        let svc = AuditService::new(Arc::new(repo));
        svc.record(CreateAuditLogInput {
            action: "domain.create".to_string(),
            resource_type: "domain".to_string(),
            ..Default::default()
        })
        .await;
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let mut repo = MockAuditRepository::new();
        repo.expect_find()
            .withf(|q| q.offset == Some(50) && q.limit == Some(50))
            .returning(|_| Ok(vec![]));
        repo.expect_count().returning(|_| Ok(120));

        let svc = AuditService::new(Arc::new(repo));
        let (logs, total) = svc.list(AuditLogQuery::default(), 2, 50).await.unwrap();
        assert!(logs.is_empty());
        assert_eq!(total, 120);
    }
}
