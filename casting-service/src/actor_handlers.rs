use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use common_auth::Authorized;
use common_http_errors::ApiError;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::app_state::AppState;
use crate::handlers::{body, resource_id};
use crate::permissions::{DeleteActors, GetActors, PatchActors, PostActors};
use crate::store::ActorInput;

pub async fn list_actors(
    auth: Authorized<GetActors>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let actors = state.store.list_actors().await.map_err(ApiError::internal)?;
    if actors.is_empty() {
        return Err(ApiError::not_found("actors_not_found"));
    }
    debug!(subject = ?auth.claims.subject, count = actors.len(), "listed actors");
    Ok(Json(json!({ "success": true, "actors": actors })))
}

pub async fn create_actor(
    auth: Authorized<PostActors>,
    State(state): State<AppState>,
    payload: Result<Json<ActorInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let input = body(payload, |message| ApiError::BadRequest {
        code: "invalid_actor",
        message,
    })?;
    let actor = state.store.insert_actor(input).await.map_err(|err| {
        error!(?err, "Failed to insert actor");
        ApiError::bad_request("actor_not_created")
    })?;
    info!(actor_id = actor.id, subject = ?auth.claims.subject, "actor created");
    Ok(Json(json!({ "success": true, "id": actor.id })))
}

/// Unlike movies, invalid actor edits are reported as 422.
pub async fn update_actor(
    auth: Authorized<PatchActors>,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<ActorInput>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let actor_id = resource_id(path, "actor_not_found")?;
    if state
        .store
        .find_actor(actor_id)
        .await
        .map_err(ApiError::internal)?
        .is_none()
    {
        return Err(ApiError::not_found("actor_not_found"));
    }

    let input = body(payload, |message| ApiError::Unprocessable {
        code: "invalid_actor",
        message,
    })?;
    let actor = state
        .store
        .update_actor(actor_id, input)
        .await
        .map_err(|err| {
            error!(?err, actor_id, "Failed to update actor");
            ApiError::unprocessable("actor_not_updated")
        })?
        .ok_or_else(|| ApiError::not_found("actor_not_found"))?;
    info!(actor_id, subject = ?auth.claims.subject, "actor updated");
    Ok(Json(json!({ "success": true, "actor": actor })))
}

pub async fn delete_actor(
    auth: Authorized<DeleteActors>,
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let actor_id = resource_id(path, "actor_not_found")?;
    let deleted = state.store.delete_actor(actor_id).await.map_err(|err| {
        error!(?err, actor_id, "Failed to delete actor");
        ApiError::bad_request("actor_not_deleted")
    })?;
    if !deleted {
        return Err(ApiError::not_found("actor_not_found"));
    }
    info!(actor_id, subject = ?auth.claims.subject, "actor deleted");
    Ok(Json(json!({ "success": true, "delete": actor_id })))
}
