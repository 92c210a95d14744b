//! Entity store business logic
//!
//! Same append-only versioning rules as the policy set service; the payload is
//! a JSON entity list instead of policy text.

use crate::error::{AppError, Result};
use crate::model::{
    CreateEntityStoreInput, EntityStore, EntityStoreVersion, UpdateEntityStoreInput, UuidStr,
};
use crate::repository::EntityStoreRepository;
use std::sync::Arc;
use validator::Validate;

pub struct EntityStoreService<R: EntityStoreRepository> {
    repo: Arc<R>,
}

impl<R: EntityStoreRepository> EntityStoreService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreateEntityStoreInput,
        created_by: Option<&str>,
    ) -> Result<EntityStore> {
        input.validate()?;

        if self
            .repo
            .find_by_name(domain_id, &input.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Entity store '{}' already exists in this domain",
                input.name
            )));
        }

        let store = self
            .repo
            .create(domain_id, &input.name, input.description.as_deref())
            .await?;

        if let Some(entities) = &input.entities {
            self.repo
                .append_version(&store.id, entities, created_by)
                .await?;
            return self.get(domain_id, &store.id).await;
        }

        Ok(store)
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<EntityStore> {
        let store = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entity store {} not found", id)))?;

        if store.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Entity store {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(store)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<EntityStore>, i64)> {
        let offset = (page - 1) * per_page;
        let stores = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((stores, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateEntityStoreInput,
        created_by: Option<&str>,
    ) -> Result<EntityStore> {
        input.validate()?;
        let existing = self.get(domain_id, id).await?;

        if let Some(name) = &input.name {
            if *name != existing.name {
                if self.repo.find_by_name(domain_id, name).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Entity store '{}' already exists in this domain",
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

        if let Some(entities) = &input.entities {
            self.repo.append_version(id, entities, created_by).await?;
        }

        self.get(domain_id, id).await
    }

    pub async fn list_versions(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<EntityStoreVersion>, i64)> {
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
    ) -> Result<EntityStoreVersion> {
        let _ = self.get(domain_id, id).await?;
        self.repo.find_version(id, version).await?.ok_or_else(|| {
            AppError::NotFound(format!("Entity store {} has no version {}", id, version))
        })
    }

    pub async fn restore_version(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        version: i64,
        created_by: Option<&str>,
    ) -> Result<EntityStoreVersion> {
        let old = self.get_version(domain_id, id, version).await?;
        self.repo.append_version(id, &old.entities, created_by).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::entity_store::MockEntityStoreRepository;

    #[tokio::test]
    async fn test_update_with_entities_appends_version() {
        let domain_id = UuidStr::new_v4();
        let store = EntityStore {
            domain_id,
            name: "users".to_string(),
            latest_version: 1,
            ..Default::default()
        };
        let store_id = store.id;

        let mut repo = MockEntityStoreRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(store.clone())));
        repo.expect_append_version()
            .times(1)
            .returning(|id, entities, _| {
                Ok(EntityStoreVersion {
                    entity_store_id: *id,
                    version: 2,
                    entities: entities.clone(),
                    ..Default::default()
                })
            });

        let svc = EntityStoreService::new(Arc::new(repo));
        let input = UpdateEntityStoreInput {
            name: None,
            description: None,
            entities: Some(serde_json::json!([{"uid": "User::\"alice\""}])),
        };

        let updated = svc.update(&domain_id, &store_id, input, None).await.unwrap();
        assert_eq!(updated.id, store_id);
    }

    #[tokio::test]
    async fn test_meta_only_update_does_not_touch_versions() {
        let domain_id = UuidStr::new_v4();
        let store = EntityStore {
            domain_id,
            name: "users".to_string(),
            ..Default::default()
        };
        let store_id = store.id;
        let updated = store.clone();

        let mut repo = MockEntityStoreRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(store.clone())));
        repo.expect_find_by_name().returning(|_, _| Ok(None));
        repo.expect_update_meta()
            .times(1)
            .returning(move |_, _, _| Ok(updated.clone()));
        repo.expect_append_version().times(0);

        let svc = EntityStoreService::new(Arc::new(repo));
        let input = UpdateEntityStoreInput {
            name: Some("accounts".to_string()),
            description: None,
            entities: None,
        };

        svc.update(&domain_id, &store_id, input, None).await.unwrap();
    }
}
