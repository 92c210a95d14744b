//! Role business logic

use crate::error::{AppError, Result};
use crate::model::{CreateRoleInput, Reference, Role, UpdateRoleInput, UuidStr};
use crate::repository::RoleRepository;
use std::sync::Arc;
use validator::Validate;

pub struct RoleService<R: RoleRepository> {
    repo: Arc<R>,
}

impl<R: RoleRepository> RoleService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, reference: &Reference, input: CreateRoleInput) -> Result<Role> {
        input.validate()?;

        if self
            .repo
            .find_by_name(reference, &input.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Role '{}' already exists",
                input.name
            )));
        }

        self.repo.create(reference, &input).await
    }

    pub async fn get(&self, reference: &Reference, id: &UuidStr) -> Result<Role> {
        let role = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role {} not found", id)))?;

        if role.reference() != *reference {
            return Err(AppError::BadRequest(format!(
                "Role {} does not belong to this {}",
                id,
                reference.reference_type.to_string().to_lowercase()
            )));
        }

        Ok(role)
    }

    pub async fn list(
        &self,
        reference: &Reference,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Role>, i64)> {
        let offset = (page - 1) * per_page;
        let roles = self
            .repo
            .list_by_reference(reference, offset, per_page)
            .await?;
        let total = self.repo.count_by_reference(reference).await?;
        Ok((roles, total))
    }

    pub async fn update(
        &self,
        reference: &Reference,
        id: &UuidStr,
        input: UpdateRoleInput,
    ) -> Result<Role> {
        input.validate()?;

        let role = self.get(reference, id).await?;
        if role.system {
            return Err(AppError::BadRequest(
                "System roles cannot be modified".to_string(),
            ));
        }

        if let Some(name) = &input.name {
            if name != &role.name
                && self.repo.find_by_name(reference, name).await?.is_some()
            {
                return Err(AppError::Conflict(format!(
                    "Role '{}' already exists",
                    name
                )));
            }
        }

        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, reference: &Reference, id: &UuidStr) -> Result<()> {
        let role = self.get(reference, id).await?;
        if role.system {
            return Err(AppError::BadRequest(
                "System roles cannot be deleted".to_string(),
            ));
        }
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::role::MockRoleRepository;

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let mut repo = MockRoleRepository::new();
        repo.expect_find_by_name()
            .returning(|_, _| Ok(Some(Role::default())));

        let svc = RoleService::new(Arc::new(repo));
        let reference = Reference::domain(UuidStr::new_v4());
        let input = CreateRoleInput {
            name: "admin".to_string(),
            description: None,
            permissions: None,
        };

        let err = svc.create(&reference, input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_refuses_system_role() {
        let reference = Reference::domain(UuidStr::new_v4());
        let role = Role {
            reference_type: reference.reference_type,
            reference_id: reference.reference_id,
            system: true,
            ..Default::default()
        };
        let mut repo = MockRoleRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(role.clone())));

        let svc = RoleService::new(Arc::new(repo));
        let input = UpdateRoleInput {
            name: Some("renamed".to_string()),
            description: None,
            permissions: None,
            default_role: None,
        };

        let err = svc
            .update(&reference, &UuidStr::new_v4(), input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
