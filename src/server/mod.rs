//! HTTP boundary
//!
//! A thin axum layer over the store: each route resolves its request into
//! exactly one store operation and serializes the result or the typed
//! error. Query keywords (`sort`, `type`, `period`) are parsed strictly —
//! an unknown keyword is a 404, not a silent default. The `limit`
//! parameter is forgiving instead: anything that does not parse to a
//! non-negative integer falls back to the configured default limit.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Group, GroupSort, Period, Statistics, Task, TaskFilter, TaskSort};
use crate::error::Error;
use crate::store::{GroupPayload, Store};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    default_limit: Option<usize>,
}

/// Builds the application router
pub fn router(store: Arc<Store>, default_limit: Option<usize>) -> Router {
    let state = AppState {
        store,
        default_limit,
    };
    Router::new()
        .route("/groups", get(list_groups))
        .route("/groups/top_parents", get(top_parents))
        .route("/groups/children/{id}", get(group_children))
        .route("/groups/new", post(create_group))
        .route(
            "/groups/{id}",
            get(show_group).put(edit_group).delete(delete_group),
        )
        .route("/tasks", get(list_tasks))
        .route("/tasks/new", post(create_task))
        .route("/tasks/group/{id}", get(group_tasks))
        .route("/tasks/{id}", get(show_task).put(update_task))
        .route("/stat/{period}", get(statistics))
        .with_state(state)
}

/// Typed core errors rendered as JSON with the matching status code
struct ApiError(Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Incoming fields for task create/edit requests
#[derive(Debug, Deserialize)]
struct TaskPayload {
    #[serde(rename = "task", default)]
    text: String,
    #[serde(rename = "group_id", default)]
    group_id: i64,
}

#[derive(Debug, Default, Deserialize)]
struct GroupListQuery {
    sort: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskListQuery {
    sort: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TypeQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FinishedQuery {
    finished: Option<String>,
}

async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<GroupListQuery>,
) -> ApiResult<Vec<Group>> {
    let sort = GroupSort::from_param(query.sort.as_deref())?;
    let limit = parse_limit(query.limit.as_deref(), state.default_limit);
    Ok(Json(state.store.list_groups(sort, limit)))
}

async fn top_parents(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<Group>> {
    let limit = parse_limit(query.limit.as_deref(), state.default_limit);
    Ok(Json(state.store.top_level_groups(limit)))
}

async fn group_children(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Group>> {
    Ok(Json(state.store.children(id)?))
}

async fn show_group(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Group> {
    Ok(Json(state.store.group(id)?))
}

async fn create_group(State(state): State<AppState>, body: Bytes) -> ApiResult<Group> {
    let payload: GroupPayload = decode(&body)?;
    Ok(Json(state.store.create_group(payload)?))
}

async fn edit_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult<Group> {
    let payload: GroupPayload = decode(&body)?;
    Ok(Json(state.store.edit_group(id, payload)?))
}

async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    state.store.delete_group(id)?;
    Ok(Json(json!({ "status": "group deleted" })))
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> ApiResult<Vec<Task>> {
    let sort = TaskSort::from_param(query.sort.as_deref())?;
    let filter = TaskFilter::from_param(query.kind.as_deref())?;
    let limit = parse_limit(query.limit.as_deref(), state.default_limit);
    Ok(Json(state.store.list_tasks(sort, filter, limit)))
}

async fn create_task(State(state): State<AppState>, body: Bytes) -> ApiResult<Task> {
    let payload: TaskPayload = decode(&body)?;
    Ok(Json(state.store.create_task(payload.group_id, payload.text)?))
}

async fn show_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    Ok(Json(state.store.task(&id)?))
}

async fn group_tasks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Vec<Task>> {
    let filter = TaskFilter::from_param(query.kind.as_deref())?;
    Ok(Json(state.store.tasks_for_group(id, filter)?))
}

/// `PUT /tasks/{id}` is two operations behind one route: with a
/// `finished=true|false` parameter it drives the completion state machine,
/// without it the body replaces the task's text and group
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FinishedQuery>,
    body: Bytes,
) -> ApiResult<Task> {
    let task = match query.finished.as_deref() {
        Some("true") => state.store.set_completed(&id, true)?,
        Some("false") => state.store.set_completed(&id, false)?,
        None => {
            let payload: TaskPayload = decode(&body)?;
            state.store.edit_task(&id, payload.group_id, payload.text)?
        }
        Some(other) => {
            return Err(Error::invalid_input(format!(
                "finished must be 'true' or 'false', got '{other}'"
            ))
            .into())
        }
    };
    Ok(Json(task))
}

async fn statistics(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> ApiResult<Statistics> {
    let period = Period::from_param(&period)?;
    Ok(Json(state.store.statistics(period)))
}

fn decode<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError(Error::invalid_input(format!("malformed request body: {e}"))))
}

/// Limit parsing is lenient: missing, unparsable, or negative values fall
/// back to the configured default (which may itself be absent, meaning no
/// limit)
fn parse_limit(raw: Option<&str>, default: Option<usize>) -> Option<usize> {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(value) if value >= 0 => Some(value as usize),
        _ => default,
    }
}
