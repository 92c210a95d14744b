//! Janus Admin - management plane for the Janus identity platform
//!
//! Exposes a REST API for administering organizations, security domains,
//! applications, identities, and the versioned authorization artifacts
//! consumed by policy-evaluation sidecars.

pub mod api;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod model;
pub mod openapi;
pub mod policy;
pub mod repository;
pub mod server;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
