//! User business logic

use crate::error::{AppError, Result};
use crate::model::{
    CreateUserInput, Reference, ReferenceType, UpdateUserInput, User, UuidStr,
};
use crate::repository::{PasswordPolicyRepository, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use std::sync::Arc;
use validator::Validate;

pub struct UserService<R: UserRepository, PR: PasswordPolicyRepository> {
    repo: Arc<R>,
    password_policy_repo: Arc<PR>,
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

impl<R: UserRepository, PR: PasswordPolicyRepository> UserService<R, PR> {
    pub fn new(repo: Arc<R>, password_policy_repo: Arc<PR>) -> Self {
        Self {
            repo,
            password_policy_repo,
        }
    }

    /// Check a candidate password against the domain's default policy, if one
    /// exists. Organization-scoped users have no policy to check.
    async fn check_password_policy(&self, reference: &Reference, password: &str) -> Result<()> {
        if reference.reference_type != ReferenceType::Domain {
            return Ok(());
        }
        if let Some(policy) = self
            .password_policy_repo
            .find_default_by_domain(&reference.reference_id)
            .await?
        {
            policy.check(password).map_err(AppError::BadRequest)?;
        }
        Ok(())
    }

    pub async fn create(&self, reference: &Reference, input: CreateUserInput) -> Result<User> {
        input.validate()?;

        if self
            .repo
            .find_by_username(reference, &input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "User '{}' already exists",
                input.username
            )));
        }

        let password_hash = match &input.password {
            Some(password) => {
                self.check_password_policy(reference, password).await?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let user = User {
            id: UuidStr::new_v4(),
            reference_type: reference.reference_type,
            reference_id: reference.reference_id,
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            password_hash,
            ..Default::default()
        };

        self.repo.create(&user).await
    }

    pub async fn get(&self, reference: &Reference, id: &UuidStr) -> Result<User> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if user.reference() != *reference {
            return Err(AppError::BadRequest(format!(
                "User {} does not belong to this {}",
                id,
                reference.reference_type.to_string().to_lowercase()
            )));
        }

        Ok(user)
    }

    pub async fn list(
        &self,
        reference: &Reference,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<User>, i64)> {
        let offset = (page - 1) * per_page;
        let users = self
            .repo
            .list_by_reference(reference, offset, per_page)
            .await?;
        let total = self.repo.count_by_reference(reference).await?;
        Ok((users, total))
    }

    pub async fn update(
        &self,
        reference: &Reference,
        id: &UuidStr,
        input: UpdateUserInput,
    ) -> Result<User> {
        input.validate()?;
        let _ = self.get(reference, id).await?;
        self.repo.update(id, &input).await
    }

    pub async fn reset_password(
        &self,
        reference: &Reference,
        id: &UuidStr,
        password: &str,
    ) -> Result<()> {
        let _ = self.get(reference, id).await?;
        self.check_password_policy(reference, password).await?;
        let password_hash = hash_password(password)?;
        self.repo.update_password_hash(id, &password_hash).await
    }

    pub async fn delete(&self, reference: &Reference, id: &UuidStr) -> Result<()> {
        let _ = self.get(reference, id).await?;
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PasswordPolicy;
    use crate::repository::password_policy::MockPasswordPolicyRepository;
    use crate::repository::user::MockUserRepository;

    fn service(
        repo: MockUserRepository,
        password_policy_repo: MockPasswordPolicyRepository,
    ) -> UserService<MockUserRepository, MockPasswordPolicyRepository> {
        UserService::new(Arc::new(repo), Arc::new(password_policy_repo))
    }

    fn input(password: Option<&str>) -> CreateUserInput {
        CreateUserInput {
            username: "jdoe".to_string(),
            email: Some("jdoe@example.com".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_, _| Ok(None));
        repo.expect_create()
            .withf(|user| {
                user.password_hash
                    .as_deref()
                    .is_some_and(|h| h.starts_with("$argon2"))
            })
            .returning(|user| Ok(user.clone()));
        let mut policy_repo = MockPasswordPolicyRepository::new();
        policy_repo
            .expect_find_default_by_domain()
            .returning(|_| Ok(None));

        let svc = service(repo, policy_repo);
        let reference = Reference::domain(UuidStr::new_v4());
        let user = svc.create(&reference, input(Some("s3cret-pass"))).await.unwrap();
        assert_eq!(user.username, "jdoe");
    }

    #[tokio::test]
    async fn test_create_enforces_default_policy() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username().returning(|_, _| Ok(None));
        let mut policy_repo = MockPasswordPolicyRepository::new();
        policy_repo.expect_find_default_by_domain().returning(|_| {
            Ok(Some(PasswordPolicy {
                min_length: 12,
                ..Default::default()
            }))
        });

        let svc = service(repo, policy_repo);
        let reference = Reference::domain(UuidStr::new_v4());
        let err = svc
            .create(&reference, input(Some("short")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_username() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_username()
            .returning(|_, _| Ok(Some(User::default())));

        let svc = service(repo, MockPasswordPolicyRepository::new());
        let reference = Reference::domain(UuidStr::new_v4());
        let err = svc.create(&reference, input(None)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
