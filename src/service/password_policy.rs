//! Password policy business logic

use crate::error::{AppError, Result};
use crate::model::{
    CreatePasswordPolicyInput, PasswordPolicy, UpdatePasswordPolicyInput, UuidStr,
};
use crate::repository::PasswordPolicyRepository;
use std::sync::Arc;
use validator::Validate;

pub struct PasswordPolicyService<R: PasswordPolicyRepository> {
    repo: Arc<R>,
}

impl<R: PasswordPolicyRepository> PasswordPolicyService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreatePasswordPolicyInput,
    ) -> Result<PasswordPolicy> {
        input.validate()?;

        let min = input.min_length.unwrap_or(8);
        let max = input.max_length.unwrap_or(128);
        if min > max {
            return Err(AppError::BadRequest(
                "min_length cannot exceed max_length".to_string(),
            ));
        }

        self.repo.create(domain_id, &input).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<PasswordPolicy> {
        let policy = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Password policy {} not found", id)))?;

        if policy.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Password policy {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(policy)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<PasswordPolicy>, i64)> {
        let offset = (page - 1) * per_page;
        let policies = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((policies, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdatePasswordPolicyInput,
    ) -> Result<PasswordPolicy> {
        input.validate()?;

        let existing = self.get(domain_id, id).await?;
        let min = input.min_length.unwrap_or(existing.min_length);
        let max = input.max_length.unwrap_or(existing.max_length);
        if min > max {
            return Err(AppError::BadRequest(
                "min_length cannot exceed max_length".to_string(),
            ));
        }

        self.repo.update(id, &input).await
    }

    pub async fn set_default(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<PasswordPolicy> {
        let _ = self.get(domain_id, id).await?;
        self.repo.set_default(domain_id, id).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::password_policy::MockPasswordPolicyRepository;

    #[tokio::test]
    async fn test_create_rejects_inverted_bounds() {
        let svc = PasswordPolicyService::new(Arc::new(MockPasswordPolicyRepository::new()));
        let input = CreatePasswordPolicyInput {
            name: "strict".to_string(),
            min_length: Some(64),
            max_length: Some(16),
            include_numbers: None,
            include_special_characters: None,
            letters_in_mixed_case: None,
            max_consecutive_letters: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_set_default_checks_ownership() {
        let mut repo = MockPasswordPolicyRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(PasswordPolicy::default())));

        let svc = PasswordPolicyService::new(Arc::new(repo));
        let err = svc
            .set_default(&UuidStr::new_v4(), &UuidStr::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
