//! Configuration management for the Janus management plane

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment: "development", "test", or "production"
    pub environment: String,
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Emails granted unconditional platform-admin access
    pub platform_admin_emails: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub access_token_ttl_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: env::var("JANUS_ENV").unwrap_or_else(|_| "development".to_string()),
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8092".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
                acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET is required")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "janus-admin".to_string()),
                access_token_ttl_secs: env::var("JWT_ACCESS_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
            },
            platform_admin_emails: env::var("PLATFORM_ADMIN_EMAILS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    /// HTTP bind address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Case-insensitive platform-admin email check
    pub fn is_platform_admin_email(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.platform_admin_emails.iter().any(|e| *e == email)
    }
}

#[cfg(test)]
impl Config {
    /// Minimal configuration for unit tests
    pub fn for_tests(platform_admin_emails: Vec<String>) -> Self {
        Self {
            environment: "test".to_string(),
            http_host: "localhost".to_string(),
            http_port: 8092,
            database: DatabaseConfig {
                url: "mysql://test".to_string(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout_secs: 30,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                issuer: "janus-admin".to_string(),
                access_token_ttl_secs: 3600,
            },
            platform_admin_emails,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_addr() {
        let config = Config::for_tests(vec![]);
        assert_eq!(config.http_addr(), "localhost:8092");
    }

    #[test]
    fn test_platform_admin_email_case_insensitive() {
        let config = Config::for_tests(vec!["admin@janus.io".to_string()]);
        assert!(config.is_platform_admin_email("Admin@Janus.io"));
        assert!(!config.is_platform_admin_email("user@janus.io"));
    }

    #[test]
    fn test_is_production() {
        let mut config = Config::for_tests(vec![]);
        assert!(!config.is_production());
        config.environment = "production".to_string();
        assert!(config.is_production());
    }
}
