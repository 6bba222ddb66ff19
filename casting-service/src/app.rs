use axum::extract::Request;
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use common_http_errors::{http_error_metrics_layer, ApiError};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::actor_handlers::{create_actor, delete_actor, list_actors, update_actor};
use crate::app_state::AppState;
use crate::handlers::{health, metrics, not_found};
use crate::movie_handlers::{create_movie, delete_movie, list_movies, update_movie};

pub const SERVICE_NAME: &str = "casting-service";

/// All routes, with the error envelope and metrics layers but without CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/:id", axum::routing::patch(update_movie).delete(delete_movie))
        .route("/actors", get(list_actors).post(create_actor))
        .route("/actors/:id", axum::routing::patch(update_actor).delete(delete_actor))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(method_not_allowed_envelope))
        .layer(middleware::from_fn(http_error_metrics_layer(SERVICE_NAME)))
}

/// The router answers unsupported methods with an empty 405; give it the
/// standard error envelope while keeping the `Allow` header.
async fn method_not_allowed_envelope(req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    if resp.status() != StatusCode::METHOD_NOT_ALLOWED || resp.headers().contains_key("X-Error-Code") {
        return resp;
    }

    let allow = resp.headers().get(axum::http::header::ALLOW).cloned();
    let mut replaced = ApiError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(axum::http::header::ALLOW, allow);
    }
    replaced
}

pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%origin, error = %err, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
