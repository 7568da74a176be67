//! Shared-secret bearer check for the keyword webhook.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// True when `headers` carry `Authorization: Bearer <secret>`.
///
/// A missing secret never authorizes.
pub(crate) fn is_authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return false;
    };
    let Some(value) = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let Some(credentials) = value.strip_prefix("Bearer ") else {
        return false;
    };
    let presented = credentials.split(' ').next().unwrap_or_default();
    constant_time_eq(presented.as_bytes(), secret.as_bytes())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
