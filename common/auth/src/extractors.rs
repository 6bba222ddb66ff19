use axum::http::{header::AUTHORIZATION, HeaderMap};
use tracing::debug;

use crate::config::ExtractionMode;
use crate::error::{AuthError, AuthResult};

/// Pull the bearer token out of the `Authorization` header.
///
/// In [`ExtractionMode::Permissive`] the shape checks only log, and the second
/// whitespace-separated segment is returned whenever one exists.
pub fn bearer_token(headers: &HeaderMap, mode: ExtractionMode) -> AuthResult<String> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;
    let raw = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let parts: Vec<&str> = raw.split_whitespace().collect();

    let problem = if parts.len() != 2 {
        Some(AuthError::MalformedHeader)
    } else if !parts[0].eq_ignore_ascii_case("bearer") {
        Some(AuthError::NotBearerScheme)
    } else {
        None
    };

    match (problem, mode) {
        (None, _) => Ok(parts[1].to_owned()),
        (Some(err), ExtractionMode::Strict) => Err(err),
        (Some(err), ExtractionMode::Permissive) => match parts.get(1) {
            Some(token) => {
                debug!(code = err.code(), reason = %err, "accepting irregular Authorization header");
                Ok((*token).to_owned())
            }
            None => Err(err),
        },
    }
}
