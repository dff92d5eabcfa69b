//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("webhook signature rejected")]
    Unauthorized,

    /// `code` is the machine-readable outcome, e.g. `account_suspended`.
    #[error("{message}")]
    Forbidden {
        code: Option<String>,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Conflict {
        code: Option<String>,
        message: String,
        remaining_attempts: Option<u32>,
    },

    #[error("verification provider error: {0}")]
    Upstream(String),

    #[error("server error: {0}")]
    Server(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining_attempts: Option<u32>,
}

impl RpcError {
    pub fn conflict(message: impl Into<String>) -> Self {
        RpcError::Conflict {
            code: None,
            message: message.into(),
            remaining_attempts: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Unauthorized => StatusCode::UNAUTHORIZED,
            RpcError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::Conflict { .. } => StatusCode::CONFLICT,
            RpcError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            RpcError::InvalidRequest(_) => "invalid_request",
            RpcError::Unauthorized => "unauthorized",
            RpcError::Forbidden { .. } => "forbidden",
            RpcError::NotFound(_) => "not_found",
            RpcError::Conflict { .. } => "conflict",
            RpcError::Upstream(_) => "upstream_error",
            RpcError::Server(_) => "server_error",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details stay in the logs.
        let message = match &self {
            RpcError::Server(detail) => {
                tracing::error!(error = %detail, "request failed");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let (code, remaining_attempts) = match &self {
            RpcError::Forbidden { code, .. } => (code.as_deref(), None),
            RpcError::Conflict {
                code,
                remaining_attempts,
                ..
            } => (code.as_deref(), *remaining_attempts),
            _ => (None, None),
        };
        let body = ErrorBody {
            error: self.kind(),
            message,
            code,
            remaining_attempts,
        };
        (status, Json(body)).into_response()
    }
}
