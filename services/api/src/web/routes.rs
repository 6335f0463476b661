//! services/api/src/web/routes.rs
//!
//! Assembles the public and protected routers around the shared state.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::auth::{login_handler, logout_handler, me_handler, register_handler};
use crate::web::contributions::{add_contribution_handler, list_contributions_handler};
use crate::web::groups::{
    create_group_handler, get_group_handler, join_group_handler, list_groups_handler,
};
use crate::web::middleware::require_auth;
use crate::web::rest::health_handler;
use crate::web::state::AppState;

pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/me", get(me_handler))
        .route("/groups", get(list_groups_handler).post(create_group_handler))
        .route("/groups/{id}", get(get_group_handler))
        .route("/groups/{id}/join", post(join_group_handler))
        .route(
            "/groups/{id}/contributions",
            get(list_contributions_handler).post(add_contribution_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
