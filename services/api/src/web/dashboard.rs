//! services/api/src/web/dashboard.rs
//!
//! Loads the caller's groups together with each group's contribution history.
//!
//! The per-group history fetches run concurrently and stop as soon as the
//! cancellation token fires. Handlers tie the token to their own lifetime
//! with a drop guard, so a request the client abandons stops its fetches.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use savings_core::ports::{DatabaseService, PortError};
use savings_core::summary::GroupCard;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Dashboard load was cancelled")]
    Cancelled,
    #[error(transparent)]
    Port(#[from] PortError),
}

pub async fn load_dashboard(
    db: &dyn DatabaseService,
    user_id: Uuid,
    now: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<Vec<GroupCard>, DashboardError> {
    let groups = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
        groups = db.get_groups_for_member(user_id) => groups?,
    };

    let fetches = groups
        .iter()
        .map(|group| db.get_contributions_for_group(group.id));
    let histories = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(DashboardError::Cancelled),
        histories = join_all(fetches) => histories,
    };

    // A group whose history fails to load still shows, with nothing contributed.
    let cards = groups
        .into_iter()
        .zip(histories)
        .map(|(group, history)| {
            let history = history.unwrap_or_else(|e| {
                warn!(group_id = %group.id, "Failed to load contributions: {:?}", e);
                Vec::new()
            });
            GroupCard::build(group, &history, user_id, now)
        })
        .collect();

    Ok(cards)
}
