use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::handlers::{parse_json, unexpected};
use crate::errors::AppError;
use crate::middleware::credential::{authenticate, Credential};
use crate::middleware::policy::{authorize, Denial, Grant, Operation, Resource};
use crate::models::token::Resolution;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
pub struct TypeRequest {
    #[serde(default)]
    pub token: String,
}

#[derive(Serialize)]
pub struct TypeResponse {
    #[serde(rename = "type")]
    pub token_type: i16,
}

#[derive(Deserialize)]
pub struct NewTokenRequest {
    #[serde(rename = "type", default)]
    pub token_type: i64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub authority: Option<String>,
}

#[derive(Serialize)]
pub struct NewTokenResponse {
    pub token: String,
}

#[derive(Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub token: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub authority: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────

/// POST /api/token/type: privilege code of a token, 9 if it does not resolve
pub async fn token_type(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TypeResponse>, AppError> {
    let req: TypeRequest = parse_json(&body)?;
    if req.token.is_empty() {
        return Err(AppError::MalformedInput("token is required".into()));
    }

    let resolution = state.registry.resolve(&req.token).await?;
    Ok(Json(TypeResponse {
        token_type: resolution.type_code(),
    }))
}

/// POST /api/token/new: mint a token with a password or a master token
pub async fn new_token(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<NewTokenResponse>, AppError> {
    let req: NewTokenRequest = parse_json(&body)?;
    let credential = Credential::from_parts(req.username, req.password, req.authority)
        .ok_or(Denial::MissingCredentials)?;

    let actor = authenticate(&credential, &state.credentials, &state.registry).await?;
    let grant = authorize(
        &actor,
        Operation::MintToken {
            requested: req.token_type,
        },
    )?;
    let Grant::Mint {
        owner_id,
        token_type,
    } = grant
    else {
        return Err(unexpected(grant));
    };

    let token = state.registry.mint(owner_id, token_type).await?;
    Ok(Json(NewTokenResponse { token: token.value }))
}

/// POST /api/token/invalidate: delete a token
pub async fn invalidate_token(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let req: InvalidateRequest = parse_json(&body)?;
    let credential = Credential::from_parts(req.username, req.password, req.authority)
        .ok_or(Denial::MissingCredentials)?;

    let Resolution::Resolved(target) = state.registry.resolve(&req.token).await? else {
        return Err(Denial::NotFound(Resource::Token).into());
    };

    let actor = authenticate(&credential, &state.credentials, &state.registry).await?;
    authorize(&actor, Operation::InvalidateToken { target: &target })?;

    // Lost a race with another invalidation.
    if !state.registry.revoke(target.id).await? {
        return Err(Denial::NotFound(Resource::Token).into());
    }
    Ok(Json(json!({})))
}
