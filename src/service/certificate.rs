//! Certificate business logic
//!
//! PEM content is parsed at creation: the SHA-256 thumbprint and the expiry
//! are computed from the DER certificate and stored alongside the content.

use crate::error::{AppError, Result};
use crate::model::{Certificate, CreateCertificateInput, UpdateCertificateInput, UuidStr};
use crate::repository::CertificateRepository;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use validator::Validate;
use x509_parser::pem::parse_x509_pem;

pub struct CertificateService<R: CertificateRepository> {
    repo: Arc<R>,
}

struct ParsedCertificate {
    thumbprint: String,
    expires_at: Option<DateTime<Utc>>,
}

fn parse_certificate(content: &str) -> Result<ParsedCertificate> {
    let (_, pem) = parse_x509_pem(content.as_bytes())
        .map_err(|e| AppError::BadRequest(format!("Invalid PEM content: {}", e)))?;
    let certificate = pem
        .parse_x509()
        .map_err(|e| AppError::BadRequest(format!("Invalid X.509 certificate: {}", e)))?;

    let digest = Sha256::digest(&pem.contents);
    let thumbprint =
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, digest);
    let expires_at = DateTime::<Utc>::from_timestamp(certificate.validity().not_after.timestamp(), 0);

    Ok(ParsedCertificate {
        thumbprint,
        expires_at,
    })
}

impl<R: CertificateRepository> CertificateService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        domain_id: &UuidStr,
        input: CreateCertificateInput,
    ) -> Result<Certificate> {
        input.validate()?;

        let parsed = parse_certificate(&input.content)?;
        let certificate = Certificate {
            id: UuidStr::new_v4(),
            domain_id: *domain_id,
            name: input.name,
            cert_type: input.cert_type,
            content: input.content,
            thumbprint: parsed.thumbprint,
            expires_at: parsed.expires_at,
            ..Default::default()
        };

        self.repo.create(&certificate).await
    }

    pub async fn get(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<Certificate> {
        let certificate = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Certificate {} not found", id)))?;

        if certificate.domain_id != *domain_id {
            return Err(AppError::BadRequest(format!(
                "Certificate {} does not belong to domain {}",
                id, domain_id
            )));
        }

        Ok(certificate)
    }

    pub async fn list(
        &self,
        domain_id: &UuidStr,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<Certificate>, i64)> {
        let offset = (page - 1) * per_page;
        let certificates = self.repo.list_by_domain(domain_id, offset, per_page).await?;
        let total = self.repo.count_by_domain(domain_id).await?;
        Ok((certificates, total))
    }

    pub async fn update(
        &self,
        domain_id: &UuidStr,
        id: &UuidStr,
        input: UpdateCertificateInput,
    ) -> Result<Certificate> {
        input.validate()?;

        let mut certificate = self.get(domain_id, id).await?;
        if certificate.system {
            return Err(AppError::BadRequest(
                "System certificates cannot be modified".to_string(),
            ));
        }

        if let Some(name) = input.name {
            certificate.name = name;
        }
        if let Some(content) = input.content {
            let parsed = parse_certificate(&content)?;
            certificate.content = content;
            certificate.thumbprint = parsed.thumbprint;
            certificate.expires_at = parsed.expires_at;
        }

        self.repo.update(id, &certificate).await
    }

    pub async fn delete(&self, domain_id: &UuidStr, id: &UuidStr) -> Result<()> {
        let certificate = self.get(domain_id, id).await?;
        if certificate.system {
            return Err(AppError::BadRequest(
                "System certificates cannot be deleted".to_string(),
            ));
        }
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::certificate::MockCertificateRepository;

    #[tokio::test]
    async fn test_create_rejects_invalid_pem() {
        let svc = CertificateService::new(Arc::new(MockCertificateRepository::new()));
        let input = CreateCertificateInput {
            name: "signing".to_string(),
            cert_type: "x509".to_string(),
            content: "not a certificate".to_string(),
        };

        let err = svc.create(&UuidStr::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_refuses_system_certificate() {
        let domain_id = UuidStr::new_v4();
        let cert = Certificate {
            domain_id,
            system: true,
            ..Default::default()
        };
        let mut repo = MockCertificateRepository::new();
        repo.expect_find_by_id().returning(move |_| Ok(Some(cert.clone())));

        let svc = CertificateService::new(Arc::new(repo));
        let err = svc.delete(&domain_id, &UuidStr::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
