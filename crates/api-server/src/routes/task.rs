//! Task API endpoints
//!
//! Every route acts on behalf of the bearer. A task owned by someone else is
//! reported exactly like a missing one.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use taskflow_core::session::Identity;
use taskflow_core::task::{Task, TaskDraft, TaskPatch, TaskRepository};
use tracing::debug;

use super::{bad_request, core_error, not_found, unauthorized, RouteError};
use crate::{auth::resolve_identity, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[serde(default)]
    pub owner_id: Option<String>,
}

fn caller(state: &AppState, headers: &HeaderMap) -> Result<Identity, RouteError> {
    resolve_identity(headers, state.tokens()).map_err(unauthorized)
}

/// Look up a task the caller owns
async fn owned_task(state: &AppState, owner: &Identity, id: &str) -> Result<Task, RouteError> {
    match state.tasks().get(id).await.map_err(core_error)? {
        Some(task) if task.owner_id == owner.uid => Ok(task),
        _ => Err(not_found(format!("Task {} not found", id))),
    }
}

/// GET /api/tasks - The caller's tasks in insertion order
async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<Task>>, RouteError> {
    let owner = caller(&state, &headers)?;
    if query.owner_id.as_deref().is_some_and(|id| id != owner.uid) {
        return Err(unauthorized("Cannot list another user's tasks"));
    }

    let tasks = state
        .tasks()
        .list_where(&owner.uid)
        .await
        .map_err(core_error)?;
    Ok(Json(tasks))
}

/// POST /api/tasks - Create a task owned by the caller
async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<TaskDraft>,
) -> Result<(StatusCode, Json<Task>), RouteError> {
    let owner = caller(&state, &headers)?;
    let record = draft.into_new_task(&owner.uid).map_err(core_error)?;

    let id = state
        .tasks()
        .insert(record.clone())
        .await
        .map_err(core_error)?;

    debug!("Created task {} for {}", id, owner.email);
    Ok((StatusCode::CREATED, Json(record.with_id(id))))
}

/// GET /api/tasks/{id}
async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Task>, RouteError> {
    let owner = caller(&state, &headers)?;
    Ok(Json(owned_task(&state, &owner, &id).await?))
}

/// PATCH /api/tasks/{id} - Update the completion flag
async fn update_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, RouteError> {
    let owner = caller(&state, &headers)?;
    if patch.is_empty() {
        return Err(bad_request("Nothing to update"));
    }

    let mut task = owned_task(&state, &owner, &id).await?;
    state
        .tasks()
        .update_fields(&id, patch)
        .await
        .map_err(core_error)?;
    patch.apply(&mut task);

    debug!("Updated task {}", id);
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    let owner = caller(&state, &headers)?;
    owned_task(&state, &owner, &id).await?;

    if !state.tasks().delete(&id).await.map_err(core_error)? {
        return Err(not_found(format!("Task {} not found", id)));
    }

    debug!("Deleted task {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}
