//! Admin authentication.
//!
//! Admin routes need a bearer JWT, which is forwarded to the backend untouched;
//! the backend decides what the token may do. The legacy admin view is also
//! gated by a shared secret, compared in constant time.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use axum::{
    extract::{Query, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::backend::BearerToken;
use crate::errors::AppError;

/// Query parameter carrying the legacy admin secret.
pub const ADMIN_SECRET_PARAM: &str = "secret";

/// Pull a bearer token out of the `Authorization` header.
pub fn bearer_from_headers(headers: &HeaderMap) -> Option<BearerToken> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(BearerToken::new)
}

/// Reject requests without a bearer token; otherwise expose it to handlers.
pub async fn require_bearer(mut request: Request, next: Next) -> Response {
    match bearer_from_headers(request.headers()) {
        Some(token) => {
            request.extensions_mut().insert(token);
            next.run(request).await
        }
        None => AppError::Unauthorized("Inicia sesión para acceder al panel".to_string())
            .into_response(),
    }
}

/// Shared-secret gate for the legacy admin view.
///
/// Disabled (every request refused) when no secret is configured.
pub async fn admin_secret_gate(
    expected_secret: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_secret else {
        return AppError::NotFound("Recurso no disponible".to_string()).into_response();
    };

    let provided = Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(params)| params.get(ADMIN_SECRET_PARAM).cloned());

    match provided {
        Some(secret) if constant_time_compare(&secret, &expected) => next.run(request).await,
        _ => AppError::Forbidden("Clave de acceso inválida".to_string()).into_response(),
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Stable, non-reversible key identifying an admin session.
pub fn session_key(token: &BearerToken) -> String {
    let mut hasher = DefaultHasher::new();
    token.as_str().hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
