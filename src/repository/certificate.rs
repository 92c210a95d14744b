//! Certificate repository

use crate::error::{AppError, Result};
use crate::model::{Certificate, UpdateCertificateInput, UuidStr};
use async_trait::async_trait;
use sqlx::MySqlPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    /// Insert a fully-built certificate. The service layer parses the PEM and
    /// computes thumbprint and expiry before calling this.
    async fn create(&self, certificate: &Certificate) -> Result<Certificate>;
    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Certificate>>;
    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Certificate>>;
    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64>;
    async fn update(&self, id: &UuidStr, certificate: &Certificate) -> Result<Certificate>;
    async fn delete(&self, id: &UuidStr) -> Result<()>;
    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64>;
}

pub struct CertificateRepositoryImpl {
    pool: MySqlPool,
}

impl CertificateRepositoryImpl {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, domain_id, name, cert_type, content, thumbprint, expires_at, \
     `system`, created_at, updated_at";

#[async_trait]
impl CertificateRepository for CertificateRepositoryImpl {
    async fn create(&self, certificate: &Certificate) -> Result<Certificate> {
        sqlx::query(
            r#"
            INSERT INTO certificates
                (id, domain_id, name, cert_type, content, thumbprint, expires_at,
                 `system`, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())
            "#,
        )
        .bind(&certificate.id)
        .bind(&certificate.domain_id)
        .bind(&certificate.name)
        .bind(&certificate.cert_type)
        .bind(&certificate.content)
        .bind(&certificate.thumbprint)
        .bind(certificate.expires_at)
        .bind(certificate.system)
        .execute(&self.pool)
        .await?;

        self.find_by_id(&certificate.id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to create certificate")))
    }

    async fn find_by_id(&self, id: &UuidStr) -> Result<Option<Certificate>> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    async fn list_by_domain(
        &self,
        domain_id: &UuidStr,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Certificate>> {
        let certificates = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates WHERE domain_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            COLUMNS
        ))
        .bind(domain_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(certificates)
    }

    async fn count_by_domain(&self, domain_id: &UuidStr) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM certificates WHERE domain_id = ?")
                .bind(domain_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    async fn update(&self, id: &UuidStr, certificate: &Certificate) -> Result<Certificate> {
        sqlx::query(
            r#"
            UPDATE certificates
            SET name = ?, content = ?, thumbprint = ?, expires_at = ?, updated_at = NOW()
            WHERE id = ?
            "#,
        )
        .bind(&certificate.name)
        .bind(&certificate.content)
        .bind(&certificate.thumbprint)
        .bind(certificate.expires_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Certificate {} not found", id)))
    }

    async fn delete(&self, id: &UuidStr) -> Result<()> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Certificate {} not found", id)));
        }

        Ok(())
    }

    async fn delete_by_domain(&self, domain_id: &UuidStr) -> Result<u64> {
        let result = sqlx::query("DELETE FROM certificates WHERE domain_id = ?")
            .bind(domain_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
