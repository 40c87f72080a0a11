use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::middleware::credential::bearer_actor;
use crate::middleware::policy::{authorize, Actor, Denial, Grant, Operation, Resource};
use crate::models::tag::Tag;
use crate::models::todo::{Todo, TodoDraft};
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct TodoRequest {
    pub todo: TodoDraft,
    pub authority: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ListRequest {
    pub authority: Option<String>,
}

#[derive(Serialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

#[derive(Serialize)]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
}

#[derive(Serialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

// ── Helpers ──────────────────────────────────────────────────

/// Decode a JSON body without insisting on a `Content-Type` header.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::MalformedInput(e.to_string()))
}

pub(crate) fn unexpected(grant: Grant) -> AppError {
    AppError::Internal(anyhow::anyhow!("policy returned unexpected grant {:?}", grant))
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/todo/update: create (no id) or update (positive id) a todo
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let req: TodoRequest = parse_json(&body)?;
    let actor = bearer_actor(req.authority.as_deref(), &state.registry).await?;

    match req.todo.existing_id() {
        None => {
            let grant = authorize(&actor, Operation::CreateTodo)?;
            let Grant::CreateAs { owner_id } = grant else {
                return Err(unexpected(grant));
            };
            state.todos.create(&req.todo, owner_id).await?;
        }
        Some(id) => {
            let ownership = state.todos.fetch_ownership(id).await?;
            authorize(&actor, Operation::UpdateTodo(ownership.as_ref()))?;
            if !state.todos.update(&req.todo).await? {
                return Err(Denial::NotFound(Resource::Todo).into());
            }
        }
    }

    Ok(Json(json!({})))
}

/// POST /api/todo/remove: delete a todo (master token of the owner)
pub async fn remove_todo(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let req: TodoRequest = parse_json(&body)?;
    let authority = req
        .authority
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::MalformedInput("authority is required".into()))?;
    let actor = bearer_actor(Some(authority), &state.registry).await?;

    let id = req.todo.id.unwrap_or(0);
    let ownership = state.todos.fetch_ownership(id).await?;
    authorize(&actor, Operation::DeleteTodo(ownership.as_ref()))?;

    if !state.todos.remove(id).await? {
        return Err(Denial::NotFound(Resource::Todo).into());
    }
    Ok(Json(json!({})))
}

/// POST /api/todo/info: full todo; private ones only for their owner
pub async fn todo_info(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TodoResponse>, AppError> {
    let req: TodoRequest = parse_json(&body)?;
    let id = req.todo.id.unwrap_or(0);

    // Cheap projection first; the full row is read only once access is granted.
    let ownership = state.todos.fetch_ownership(id).await?;
    let actor = bearer_actor(req.authority.as_deref(), &state.registry).await?;
    authorize(&actor, Operation::ReadTodo(ownership.as_ref()))?;

    let todo = state
        .todos
        .fetch_full(id)
        .await?
        .ok_or(Denial::NotFound(Resource::Todo))?;
    Ok(Json(TodoResponse { todo }))
}

/// GET|POST /api/todos/list: public todos, plus private ones for a master token
pub async fn list_todos(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TodosResponse>, AppError> {
    let req: ListRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ListRequest::default()
    } else {
        parse_json(&body)?
    };
    let actor = bearer_actor(req.authority.as_deref(), &state.registry).await?;

    let grant = authorize(&actor, Operation::ListTodos)?;
    let Grant::ListVisible { owner_id } = grant else {
        return Err(unexpected(grant));
    };

    let todos = state.todos.list_visible(owner_id).await?;
    Ok(Json(TodosResponse { todos }))
}

/// GET /api/tags/list: every tag
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<TagsResponse>, AppError> {
    authorize(&Actor::Anonymous, Operation::ListTags)?;
    let tags = state.todos.list_tags().await?;
    Ok(Json(TagsResponse { tags }))
}
