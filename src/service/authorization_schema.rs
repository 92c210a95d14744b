//! Authorization schema business logic
//!
//! Versioned exactly like policy sets and entity stores.

use crate::error::{AppError, Result};
use crate::model::{
    AuthorizationSchema, AuthorizationSchemaVersion, CreateAuthorizationSchemaInput,
    UpdateAuthorizationSchemaInput, UuidStr,
};
use crate::repository::AuthorizationSchemaRepository;
use std::sync::Arc;
use validator::Validate;

pub struct AuthorizationSchemaService<R: AuthorizationSchemaRepository> {
    repo: Arc<R>,
}

impl<R: AuthorizationSchemaRepository> AuthorizationSchemaService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreateAuthorizationSchemaInput,
        created_by: Option<&str>,
    ) -> Result<AuthorizationSchema> {
        input.validate()?;

        if self
            .repo
            .find_by_name(domain_id, &input.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Schema '{}' already exists in this domain",
                input.name
            )));
        }

        let schema = self
            .repo
            .create(domain_id, &input.name, input.description.as_deref())
            .await?;

        if let Some(content) = &input.schema {
            self.repo
                .append_version(&schema.id, content, created_by)
                .await?;
            return self.get(domain_id, &schema.id).await;
        }

        Ok(schema)
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<AuthorizationSchema> {
        let schema = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Schema {} not found", id)))?;

        if schema.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Schema {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(schema)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AuthorizationSchema>, i64)> {
        let offset = (page - 1) * per_page;
        let schemas = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((schemas, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateAuthorizationSchemaInput,
        created_by: Option<&str>,
    ) -> Result<AuthorizationSchema> {
        input.validate()?;
        let existing = self.get(domain_id, id).await?;

        if let Some(name) = &input.name {
            if *name != existing.name {
                if self.repo.find_by_name(domain_id, name).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Schema '{}' already exists in this domain",
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

        if let Some(content) = &input.schema {
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
    ) -> Result<(Vec<AuthorizationSchemaVersion>, i64)> {
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
    ) -> Result<AuthorizationSchemaVersion> {
        let _ = self.get(domain_id, id).await?;
        self.repo.find_version(id, version).await?.ok_or_else(|| {
            AppError::NotFound(format!("Schema {} has no version {}", id, version))
        })
    }

    pub async fn restore_version(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        version: i64,
        created_by: Option<&str>,
    ) -> Result<AuthorizationSchemaVersion> {
        let old = self.get_version(domain_id, id, version).await?;
        self.repo.append_version(id, &old.schema, created_by).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::authorization_schema::MockAuthorizationSchemaRepository;

    #[tokio::test]
    async fn test_create_without_schema_stays_at_version_zero() {
        let mut repo = MockAuthorizationSchemaRepository::new();
        repo.expect_find_by_name().returning(|_, _| Ok(None));
        repo.expect_create().returning(|domain_id, name, _| {
            Ok(AuthorizationSchema {
                domain_id: *domain_id,
                name: name.to_string(),
                ..Default::default()
            })
        });
        repo.expect_append_version().times(0);

        let svc = AuthorizationSchemaService::new(Arc::new(repo));
        let input = CreateAuthorizationSchemaInput {
            name: "core".to_string(),
            description: None,
            schema: None,
        };

        let schema = svc.create(&UuidStr::new_v4(), input, None).await.unwrap();
        assert_eq!(schema.latest_version, 0);
    }

    #[tokio::test]
    async fn test_get_rejects_foreign_domain() {
        let mut repo = MockAuthorizationSchemaRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(AuthorizationSchema::default())));

        let svc = AuthorizationSchemaService::new(Arc::new(repo));
        let err = svc
            .get(&UuidStr::new_v4(), &UuidStr::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
