//! Sharding tag business logic

use crate::error::{AppError, Result};
use crate::model::tag::slugify_tag_name;
use crate::model::{CreateTagInput, Tag, UpdateTagInput, UuidStr};
use crate::repository::TagRepository;
use std::sync::Arc;
use validator::Validate;

pub struct TagService<R: TagRepository> {
    repo: Arc<R>,
}

impl<R: TagRepository> TagService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// The tag key is derived from the name at creation and never changes.
    pub async fn create(&self, organization_id: &UuidStr, input: CreateTagInput) -> Result<Tag> {
        input.validate()?;

        let key = slugify_tag_name(&input.name);
        if key.is_empty() {
            return Err(AppError::BadRequest(
                "Tag name must contain at least one alphanumeric character".to_string(),
            ));
        }

        if self.repo.find_by_key(organization_id, &key).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Tag '{}' already exists in this organization",
                key
            )));
        }

        let tag = Tag {
            id: UuidStr::new_v4(),
            organization_id: *organization_id,
            key,
            name: input.name,
            description: input.description,
            ..Default::default()
        };

        self.repo.create(&tag).await
    }

    pub async fn get(&self, organization_id: &UuidStr, id: &UuidStr) -> Result<Tag> {
        let tag = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))?;

        if tag.organization_id != *organization_id {
            return Err(AppError::BadRequest(format!(
                "Tag {} does not belong to organization {}",
                id, organization_id
            )));
        }

        Ok(tag)
    }

    pub async fn list(
        &self,
        organization_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Tag>, i64)> {
        let offset = (page - 1) * per_page;
        let tags = self
            .repo
            .list_by_organization(organization_id, offset, per_page)
            .await?;
        let total = self.repo.count_by_organization(organization_id).await?;
        Ok((tags, total))
    }

    pub async fn update(
        &self,
        organization_id: &UuidStr,
        id: &UuidStr,
        input: UpdateTagInput,
    ) -> Result<Tag> {
        input.validate()?;
        let _ = self.get(organization_id, id).await?;
        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, organization_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(organization_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tag::MockTagRepository;

    #[tokio::test]
    async fn test_create_derives_key_from_name() {
        let mut repo = MockTagRepository::new();
        repo.expect_find_by_key().returning(|_, _| Ok(None));
        repo.expect_create()
            .withf(|tag| tag.key == "eu-west")
            .returning(|tag| Ok(tag.clone()));

        let svc = TagService::new(Arc::new(repo));
        let input = CreateTagInput {
            name: "EU West".to_string(),
            description: None,
        };

        let tag = svc.create(&UuidStr::new_v4(), input).await.unwrap();
        assert_eq!(tag.name, "EU West");
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_key() {
        let mut repo = MockTagRepository::new();
        repo.expect_find_by_key()
            .returning(|_, _| Ok(Some(Tag::default())));

        let svc = TagService::new(Arc::new(repo));
        let input = CreateTagInput {
            name: "EU West".to_string(),
            description: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
