//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request user context.

use crate::config::Config;
use savings_core::domain::User;
use savings_core::ports::DatabaseService;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
}

//=========================================================================================
// CurrentUser (Specific to One Request)
//=========================================================================================

/// The signed-in user, resolved from the session cookie by `require_auth`
/// and handed to protected handlers through request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}
