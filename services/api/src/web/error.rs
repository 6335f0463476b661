//! services/api/src/web/error.rs
//!
//! The error type returned by every handler. Backend failures are logged and
//! collapsed into one generic message per action.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use savings_core::{FieldErrors, PortError};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Per-field messages, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Validation failed")]
    Validation(#[from] FieldErrors),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    /// A backend operation failed; the message names the action.
    #[error("{0}")]
    Failed(&'static str),
}

impl HandlerError {
    /// Logs a port failure and replaces it with the action's generic message.
    pub fn failed(action: &'static str) -> impl FnOnce(PortError) -> HandlerError {
        move |e| {
            error!("{}: {:?}", action, e);
            HandlerError::Failed(action)
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HandlerError::Conflict(_) => StatusCode::CONFLICT,
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
            fields: match self {
                HandlerError::Validation(fields) => Some(fields.as_map().clone()),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}
