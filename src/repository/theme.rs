//! Theme repository

use crate::error::{AppError, Result};
use crate::model::{CreateThemeInput, Theme, UpdateThemeInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThemeRepository: Send + Sync {
    async fn create(&self, domain_id: &UuidStr, input: &CreateThemeInput) -> Result<Theme>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Theme>>;
    async fn find_by_domain(&self, domain_id: &UuidStr) -> Result<Option<Theme>>;
    async fn update(&self, id: &UuidStr, input: &UpdateThemeInput) -> Result<Theme>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct ThemeRepositoryImpl {
    pool: MySqlPool,
}

impl ThemeRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, logo_url, favicon_url, primary_button_color, \
     secondary_button_color, primary_text_color, css, created_at, updated_at";

#[async_trait]
impl ThemeRepository for ThemeRepositoryImpl {
    async fn create(&self, domain_id: &UuidStr, input: &CreateThemeInput) -> Result<Theme> {
        let id = UuidStr::new_v4();

        sqlx::query(
            r#"
            INSERT INTO themes
                (id, domain_id, logo_url, favicon_url, primary_button_color,
                 secondary_button_color, primary_text_color, css, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(domain_id)
        .bind(&input.logo_url)
        .bind(&input.favicon_url)
        .bind(&input.primary_button_color)
        .bind(&input.secondary_button_color)
        .bind(&input.primary_text_color)
        .bind(&input.css)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create theme")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Theme>> {
        let theme = sqlx::query_as::<_, Theme>(&format!(
            "SELECT {} FROM themes WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(theme)
    }

    async fn find_by_domain(&self, domain_id: &UuidStr) -> Result<Option<Theme>> {
        let theme = sqlx::query_as::<_, Theme>(&format!(
            "SELECT {} FROM themes WHERE domain_id = ?",
            COLUMNS
        ))
        .bind(domain_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(theme)
    }

    async fn update(&self, id: &UuidStr, input: &UpdateThemeInput) -> Result<Theme> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Theme {} not found", id)))?;

        let logo_url = input.logo_url.as_ref().or(existing.logo_url.as_ref());
        let favicon_url = input.favicon_url.as_ref().or(existing.favicon_url.as_ref());
        let primary_button_color = input
            .primary_button_color
            .as_ref()
            .or(existing.primary_button_color.as_ref());
        let secondary_button_color = input
            .secondary_button_color
            .as_ref()
            .or(existing.secondary_button_color.as_ref());
        let primary_text_color = input
            .primary_text_color
            .as_ref()
            .or(existing.primary_text_color.as_ref());
        let css = input.css.as_ref().or(existing.css.as_ref());

        sqlx::query(
            r#"
            UPDATE themes
            SET logo_url = ?, favicon_url = ?, primary_button_color = ?,
                secondary_button_color = ?, primary_text_color = ?, css = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(logo_url)
        .bind(favicon_url)
        .bind(primary_button_color)
        .bind(secondary_button_color)
        .bind(primary_text_color)
        .bind(css)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to update theme")))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM themes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Theme {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM themes WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
