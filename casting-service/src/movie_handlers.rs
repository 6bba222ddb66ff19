use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use common_auth::Authorized;
use common_http_errors::ApiError;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::app_state::AppState;
use crate::handlers::{body, resource_id};
use crate::permissions::{DeleteMovies, GetMovies, PatchMovies, PostMovies};
use crate::store::MovieInput;

pub async fn list_movies(
    auth: Authorized<GetMovies>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let movies = state.store.list_movies().await.map_err(ApiError::internal)?;
    if movies.is_empty() {
        return Err(ApiError::not_found("movies_not_found"));
    }
    debug!(subject = ?auth.claims.subject, count = movies.len(), "listed movies");
    Ok(Json(json!({ "success": true, "movies": movies })))
}

pub async fn create_movie(
    auth: Authorized<PostMovies>,
    State(state): State<AppState>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload, |message| ApiError::BadRequest {
        code: "invalid_movie",
        message,
    })?;
    let movie = state.store.insert_movie(input).await.map_err(|err| {
        error!(?err, "Failed to insert movie");
        ApiError::bad_request("movie_not_created")
    })?;
    info!(movie_id = movie.id, subject = ?auth.claims.subject, "movie created");
    Ok(Json(json!({ "success": true, "id": movie.id })))
}

pub async fn update_movie(
    auth: Authorized<PatchMovies>,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let movie_id = resource_id(path, "movie_not_found")?;
    if state
        .store
        .find_movie(movie_id)
        .await
        .map_err(ApiError::internal)?
        .is_none()
    {
        return Err(ApiError::not_found("movie_not_found"));
    }

    let input = body(payload, |message| ApiError::BadRequest {
        code: "invalid_movie",
        message,
    })?;
    let movie = state
        .store
        .update_movie(movie_id, input)
        .await
        .map_err(|err| {
            error!(?err, movie_id, "Failed to update movie");
            ApiError::bad_request("movie_not_updated")
        })?
        .ok_or_else(|| ApiError::not_found("movie_not_found"))?;
    info!(movie_id, subject = ?auth.claims.subject, "movie updated");
    Ok(Json(json!({ "success": true, "movie": movie })))
}

pub async fn delete_movie(
    auth: Authorized<DeleteMovies>,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let movie_id = resource_id(path, "movie_not_found")?;
    let deleted = state.store.delete_movie(movie_id).await.map_err(|err| {
        error!(?err, movie_id, "Failed to delete movie");
        ApiError::bad_request("movie_not_deleted")
    })?;
    if !deleted {
        return Err(ApiError::not_found("movie_not_found"));
    }
    info!(movie_id, subject = ?auth.claims.subject, "movie deleted");
    Ok(Json(json!({ "success": true, "delete": movie_id })))
}
