//! Application business logic

use crate::error::{AppError, Result};
use crate::model::{Application, CreateApplicationInput, UpdateApplicationInput, UuidStr};
use crate::repository::ApplicationRepository;
use rand::Rng;
use std::sync::Arc;
use validator::Validate;

pub struct ApplicationService<R: ApplicationRepository> {
    repo: Arc<R>,
}

impl<R: ApplicationRepository> ApplicationService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreateApplicationInput,
    ) -> Result<Application> {
        input.validate()?;

        let client_id = match input.client_id {
            Some(client_id) => client_id,
            None => generate_client_id(),
        };

        if self.repo.find_by_client_id(&client_id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Application with client_id '{}' already exists",
                client_id
            )));
        }

        let defaults = Application::default();
        let application = Application {
            id: UuidStr::new_v4(),
            domain_id: *domain_id,
            name: input.name,
            app_type: input.app_type,
            description: input.description,
            client_id,
            client_secret: generate_client_secret(),
            redirect_uris: input.redirect_uris.unwrap_or_default(),
            grant_types: input.grant_types.unwrap_or(defaults.grant_types),
            ..defaults
        };

        self.repo.create(&application).await
    }

    /// Fetch an application nested under a domain path; an application owned
    /// by a different domain is a bad request, not a 404.
    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<Application> {
        let application = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {} not found", id)))?;

        if application.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Application {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(application)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Application>, i64)> {
        let offset = (page - 1) * per_page;
        let applications = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((applications, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateApplicationInput,
    ) -> Result<Application> {
        input.validate()?;
        let _ = self.get(domain_id, id).await?;
        self.repo.update(id, &input).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let _ = self.get(domain_id, id).await?;
        self.repo.delete(id).await
    }
}

fn generate_client_id() -> String {
    UuidStr::new_v4().to_string().replace('-', "")
}

fn generate_client_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ApplicationType;
    use crate::repository::application::MockApplicationRepository;

    fn input() -> CreateApplicationInput {
        CreateApplicationInput {
            name: "Portal".to_string(),
            app_type: ApplicationType::Web,
            description: None,
            client_id: None,
            redirect_uris: Some(vec!["https://portal.example.com/callback".to_string()]),
            grant_types: None,
        }
    }

    #[tokio::test]
    async fn test_create_generates_credentials() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_find_by_client_id().returning(|_| Ok(None));
        repo.expect_create()
            .withf(|app| !app.client_id.is_empty() && !app.client_secret.is_empty())
            .returning(|app| Ok(app.clone()));

        let svc = ApplicationService::new(Arc::new(repo));
        let application = svc.create(&UuidStr::new_v4(), input()).await.unwrap();
        assert_eq!(application.grant_types, vec!["authorization_code"]);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_client_id() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_find_by_client_id()
            .returning(|_| Ok(Some(Application::default())));

        let svc = ApplicationService::new(Arc::new(repo));
        let mut create = input();
        create.client_id = Some("portal".to_string());

        let err = svc.create(&UuidStr::new_v4(), create).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_rejects_foreign_domain() {
        let mut repo = MockApplicationRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Ok(Some(Application::default())));

        let svc = ApplicationService::new(Arc::new(repo));
        let err = svc
            .get(&UuidStr::new_v4(), &UuidStr::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
