//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::error::HandlerError;
use crate::web::state::{AppState, CurrentUser};

pub const SESSION_COOKIE: &str = "session";

/// Reads the auth session id out of the `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (name, value) = c.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
        })
}

/// Middleware that validates the auth session cookie and loads the user.
///
/// If valid, inserts a `CurrentUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HandlerError> {
    let auth_session_id = session_id_from_headers(req.headers())
        .ok_or(HandlerError::Unauthorized("Not signed in"))?;

    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            warn!("Rejected auth session: {:?}", e);
            HandlerError::Unauthorized("Not signed in")
        })?;

    let user = state.db.get_user_by_id(user_id).await.map_err(|e| {
        error!("Failed to load user for session: {:?}", e);
        HandlerError::Unauthorized("Not signed in")
    })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
