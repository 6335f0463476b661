pub mod auth;
pub mod contributions;
pub mod dashboard;
pub mod error;
pub mod groups;
pub mod middleware;
pub mod rest;
pub mod routes;
pub mod state;

// Re-export what the binary needs to build the web server.
pub use routes::build_router;
pub use state::AppState;
