//! A `DatabaseService` with one group whose history fetch never completes,
//! and whose user lookups fail as if the store were down.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use savings_core::domain::{
    AuthSession, Contribution, Group, NewContribution, NewGroup, User, UserCredentials,
};
use savings_core::ports::{DatabaseService, PortError, PortResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

pub struct StubDb {
    pub user: User,
    pub group: Group,
    /// Notified once a history fetch is in flight.
    pub fetch_started: Notify,
    /// Set when an in-flight history fetch is dropped before finishing.
    pub fetch_dropped: Arc<AtomicBool>,
    pub writes: AtomicUsize,
}

impl StubDb {
    pub fn new() -> Self {
        let user = User {
            user_id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            display_name: "Ana".to_string(),
        };
        let group = Group {
            id: Uuid::new_v4(),
            name: "Slow goal".to_string(),
            description: None,
            target_amount: dec!(100),
            target_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            members: vec![user.user_id],
            created_by: user.user_id,
            created_at: Utc::now(),
        };
        Self {
            user,
            group,
            fetch_started: Notify::new(),
            fetch_dropped: Arc::new(AtomicBool::new(false)),
            writes: AtomicUsize::new(0),
        }
    }

    fn record_write(&self) -> PortError {
        self.writes.fetch_add(1, Ordering::SeqCst);
        PortError::Unexpected("writes are not supported".to_string())
    }
}

struct SetOnDrop(Arc<AtomicBool>);

impl Drop for SetOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DatabaseService for StubDb {
    async fn create_user(&self, _: &str, _: &str, _: &str) -> PortResult<User> {
        Err(self.record_write())
    }

    async fn get_user_by_email(&self, _: &str) -> PortResult<UserCredentials> {
        Err(PortError::Unexpected("connection refused".to_string()))
    }

    async fn get_user_by_id(&self, _: Uuid) -> PortResult<User> {
        Ok(self.user.clone())
    }

    async fn create_auth_session(&self, _: &AuthSession) -> PortResult<()> {
        Err(self.record_write())
    }

    async fn validate_auth_session(&self, _: &str) -> PortResult<Uuid> {
        Err(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, _: &str) -> PortResult<()> {
        Err(self.record_write())
    }

    async fn create_group(&self, _: NewGroup, _: Uuid) -> PortResult<Group> {
        Err(self.record_write())
    }

    async fn get_groups_for_member(&self, _: Uuid) -> PortResult<Vec<Group>> {
        Ok(vec![self.group.clone()])
    }

    async fn join_group(&self, _: Uuid, _: Uuid) -> PortResult<()> {
        Err(self.record_write())
    }

    async fn create_contribution(&self, _: NewContribution) -> PortResult<Contribution> {
        Err(self.record_write())
    }

    async fn get_contributions_for_group(&self, _: Uuid) -> PortResult<Vec<Contribution>> {
        let _in_flight = SetOnDrop(self.fetch_dropped.clone());
        self.fetch_started.notify_one();
        std::future::pending::<()>().await;
        Ok(Vec::new())
    }
}
