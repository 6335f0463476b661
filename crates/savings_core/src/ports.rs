//! crates/savings_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to stay independent of the concrete user store and document store.

use crate::domain::{
    AuthSession, Contribution, Group, NewContribution, NewGroup, User, UserCredentials,
};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Creates an account. Fails with `Conflict` when the email is already registered.
    async fn create_user(
        &self,
        email: &str,
        display_name: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    // --- Auth Sessions ---
    async fn create_auth_session(&self, session: &AuthSession) -> PortResult<()>;

    /// Returns the owner of a live session, `Unauthorized` if it is unknown or expired.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Groups ---

    /// Stores a group whose only member is its creator.
    async fn create_group(&self, group: NewGroup, created_by: Uuid) -> PortResult<Group>;

    /// Groups the user belongs to, newest first.
    async fn get_groups_for_member(&self, user_id: Uuid) -> PortResult<Vec<Group>>;

    /// Adds the user to the group's members. Joining twice is a no-op.
    async fn join_group(&self, group_id: Uuid, user_id: Uuid) -> PortResult<()>;

    // --- Contributions ---
    async fn create_contribution(&self, contribution: NewContribution)
        -> PortResult<Contribution>;

    /// Contributions of one group, newest first.
    async fn get_contributions_for_group(&self, group_id: Uuid) -> PortResult<Vec<Contribution>>;
}
