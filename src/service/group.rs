//! Group business logic

use crate::error::{AppError, Result};
use crate::model::{CreateGroupInput, Group, Reference, UpdateGroupInput, UuidStr};
use crate::repository::GroupRepository;
use std::sync::Arc;
use validator::Validate;

pub struct GroupService<R: GroupRepository> {
    repo: Arc<R>,
}

impl<R: GroupRepository> GroupService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, reference: &Reference, input: CreateGroupInput) -> Result<Group> {
        input.validate()?;

        if self
            .repo
            .find_by_name(reference, &input.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Group '{}' already exists",
                input.name
            )));
        }

        self.repo.create(reference, &input).await
    }

    pub async fn get(&self, reference: &Reference, id: &UuidStr) -> Result<Group> {
        let group = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", id)))?;

        if group.reference() != *reference {
            return Err(AppError::BadRequest(format!(
                "Group {} does not belong to this {}",
                id,
                reference.reference_type.to_string().to_lowercase()
            )));
        }

        Ok(group)
    }

    pub async fn list(
        &self,
        reference: &Reference,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Group>, i64)> {
        let offset = (page - 1) * per_page;
        let groups = self
            .repo
            .list_by_reference(reference, offset, per_page)
            .await?;
        let total = self.repo.count_by_reference(reference).await?;
        Ok((groups, total))
    }

    pub async fn update(
        &self,
        reference: &Reference,
        id: &UuidStr,
        input: UpdateGroupInput,
    ) -> Result<Group> {
        input.validate()?;

        let group = self.get(reference, id).await?;
        if let Some(name) = &input.name {
            if name != &group.name
                && self.repo.find_by_name(reference, name).await?.is_some()
            {
                return Err(AppError::Conflict(format!(
                    "Group '{}' already exists",
                    name
                )));
            }
        }

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
    use crate::repository::group::MockGroupRepository;

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut repo = MockGroupRepository::new();
        repo.expect_find_by_name()
            .returning(|_, _| Ok(Some(Group::default())));

        let svc = GroupService::new(Arc::new(repo));
        let reference = Reference::organization(UuidStr::new_v4());
        let input = CreateGroupInput {
            name: "engineers".to_string(),
            description: None,
            members: None,
        };

        let err = svc.create(&reference, input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_rejects_foreign_reference() {
        let mut repo = MockGroupRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Group::default())));

        let svc = GroupService::new(Arc::new(repo));
        let reference = Reference::organization(UuidStr::new_v4());
        let err = svc.get(&reference, &UuidStr::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
