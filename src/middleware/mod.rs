//! HTTP middleware for the management API
//!
//! - JWT authentication extractor
//! - Request ID + metrics observability layer
//! - Security headers

pub mod auth;
pub mod metrics;
pub mod security_headers;

pub use auth::{AuthState, AuthUser};
pub use metrics::ObservabilityLayer;
pub use security_headers::security_headers_middleware;
