use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::middleware::policy::{Denial, Resource};
use crate::resources::ResourceError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("{0}")]
    Denied(#[from] Denial),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ResourceError> for AppError {
    fn from(e: ResourceError) -> Self {
        match e {
            ResourceError::Rejected(reason) => AppError::MalformedInput(reason.to_string()),
            ResourceError::Store(e) => AppError::Storage(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::Denied(denial) => denial_status(denial),
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedInput(_) => "malformed_input",
            AppError::Denied(denial) => denial.code(),
            AppError::Storage(_) | AppError::Internal(_) => "internal_server_error",
        }
    }
}

/// 400 covers bad input and anything that must not reveal existence;
/// 403 is reserved for callers who are known but not allowed.
fn denial_status(denial: &Denial) -> StatusCode {
    match denial {
        Denial::MissingCredentials
        | Denial::InvalidTokenType
        | Denial::NotFound(_)
        | Denial::OwnershipMismatch(Resource::Token) => StatusCode::BAD_REQUEST,
        Denial::InvalidCredentials
        | Denial::InsufficientPrivilege(_)
        | Denial::SelfInvalidationRequired
        | Denial::OwnershipMismatch(Resource::Todo) => StatusCode::FORBIDDEN,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let msg = match &self {
            AppError::MalformedInput(reason) => {
                tracing::debug!(code, "rejected malformed input: {}", reason);
                reason.clone()
            }
            AppError::Denied(denial) => {
                tracing::warn!(code, status = status.as_u16(), "request denied");
                denial.to_string()
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                "Database error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": msg,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::policy::Privileged;

    #[test]
    fn test_status_mapping() {
        let cases: [(AppError, u16); 11] = [
            (AppError::MalformedInput("x".into()), 400),
            (Denial::MissingCredentials.into(), 400),
            (Denial::InvalidCredentials.into(), 403),
            (Denial::InvalidTokenType.into(), 400),
            (Denial::InsufficientPrivilege(Privileged::CreateTodo).into(), 403),
            (Denial::SelfInvalidationRequired.into(), 403),
            (Denial::OwnershipMismatch(Resource::Todo).into(), 403),
            (Denial::OwnershipMismatch(Resource::Token).into(), 400),
            (Denial::NotFound(Resource::Todo).into(), 400),
            (Denial::NotFound(Resource::Token).into(), 400),
            (
                AppError::Storage(StoreError::Constraint("dup".into())),
                500,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_storage_error_hides_details() {
        let err = AppError::Storage(StoreError::Constraint("users_name_key".into()));
        assert_eq!(err.code(), "internal_server_error");
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_resource_rejection_is_malformed_input() {
        let err: AppError = ResourceError::Rejected("todo name is required").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "malformed_input");
    }
}
