use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failure raised anywhere in the authorization pipeline.
///
/// The `Display` output is the caller-facing message. Payloads carry internal
/// detail for logs only and never reach the response body.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No Authorization header")]
    MissingHeader,
    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedHeader,
    #[error("Not bearer token")]
    NotBearerScheme,
    #[error("Authorization malformed")]
    MissingKeyId,
    #[error("Unable to find the appropriate key.")]
    UnknownKeyId(String),
    #[error("Unable to parse authentication token")]
    InvalidToken(String),
    #[error("Unable to fetch signing keys")]
    JwksUnavailable(String),
    #[error("Token expired")]
    TokenExpired,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims(String),
    #[error("Permissions not included in JWT")]
    MissingPermissions,
    #[error("Permission not found")]
    PermissionNotFound(String),
}

impl AuthError {
    /// Machine-readable code rendered in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::NotBearerScheme
            | AuthError::PermissionNotFound(_) => "unauthorized",
            AuthError::MissingKeyId
            | AuthError::UnknownKeyId(_)
            | AuthError::InvalidToken(_)
            | AuthError::JwksUnavailable(_) => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) | AuthError::MissingPermissions => "invalid_claims",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::NotBearerScheme
            | AuthError::MissingKeyId
            | AuthError::TokenExpired
            | AuthError::InvalidClaims(_) => StatusCode::UNAUTHORIZED,
            AuthError::UnknownKeyId(_)
            | AuthError::InvalidToken(_)
            | AuthError::JwksUnavailable(_)
            | AuthError::MissingPermissions => StatusCode::BAD_REQUEST,
            AuthError::PermissionNotFound(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Maps a `jsonwebtoken` decode failure onto the taxonomy: expiry and claim
    /// mismatches are distinguished, everything else is an unparseable token.
    pub(crate) fn from_decode(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims(err.to_string()),
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

/// Wire shape of every authorization failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&AuthError> for ErrorBody {
    fn from(value: &AuthError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let mut resp = (status, Json(ErrorBody::from(&self))).into_response();
        resp.headers_mut()
            .insert("X-Error-Code", HeaderValue::from_static(code));
        resp
    }
}

/// Rejected configuration detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required setting '{0}' is missing or blank")]
    Missing(&'static str),
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
}
