use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use common_http_errors::ApiError;
use tracing::debug;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        common_http_errors::metrics::gather(),
    )
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("route_not_found")
}

/// Unwrap a JSON body, mapping any rejection to `err`.
pub(crate) fn body<T>(
    body: Result<Json<T>, JsonRejection>,
    err: impl FnOnce(Option<String>) -> ApiError,
) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejecting request body");
            Err(err(Some(rejection.body_text())))
        }
    }
}

/// Ids that do not parse cannot name an existing row.
pub(crate) fn resource_id(
    path: Result<Path<i32>, PathRejection>,
    code: &'static str,
) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found(code))
}
