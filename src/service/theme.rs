//! Theme business logic

use crate::error::{AppError, Result};
use crate::model::{CreateThemeInput, Theme, UpdateThemeInput, UuidStr};
use crate::repository::ThemeRepository;
use std::sync::Arc;
use validator::Validate;

pub struct ThemeService<R: ThemeRepository> {
    repo: Arc<R>,
}

impl<R: ThemeRepository> ThemeService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// A domain holds at most one theme.
    pub async fn create(&self, domain_id: &UuidStr, input: CreateThemeInput) -> Result<Theme> {
        input.validate()?;

        if self.repo.find_by_domain(domain_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Domain already has a theme".to_string(),
            ));
        }

        self.repo.create(domain_id, &input).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<Theme> {
        let theme = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Theme {} not found", id)))?;

        if theme.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Theme {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(theme)
    }

    pub async fn list(&self, domain_id: &UuidStr) -> Result<Vec<Theme>> {
        Ok(self
            .repo
            .find_by_domain(domain_id)
            .await?
            .into_iter()
            .collect())
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateThemeInput,
    ) -> Result<Theme> {
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
    use crate::repository::theme::MockThemeRepository;

    #[tokio::test]
    async fn test_create_rejects_second_theme() {
        let mut repo = MockThemeRepository::new();
        repo.expect_find_by_domain()
            .returning(|_| Ok(Some(Theme::default())));

        let svc = ThemeService::new(Arc::new(repo));
        let input = CreateThemeInput {
            logo_url: None,
            favicon_url: None,
            primary_button_color: None,
            secondary_button_color: None,
            primary_text_color: None,
            css: None,
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
