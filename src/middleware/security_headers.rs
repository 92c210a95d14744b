//! Security headers middleware
//!
//! Adds standard hardening headers to all API responses.

use axum::{body::Body, http::header, http::Request, middleware::Next, response::Response};

pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    if let Ok(value) = "nosniff".parse() {
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, value);
    }
    if let Ok(value) = "DENY".parse() {
        headers.insert(header::X_FRAME_OPTIONS, value);
    }
    if let Ok(value) = "strict-origin-when-cross-origin".parse() {
        headers.insert(header::REFERRER_POLICY, value);
    }
    // Management responses carry credentials and secrets; never cache them
    if let Ok(value) = "no-store, no-cache, must-revalidate, private".parse() {
        headers.insert(header::CACHE_CONTROL, value);
    }

    response
}
