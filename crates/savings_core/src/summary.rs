//! crates/savings_core/src/summary.rs
//!
//! Derived views over an already-fetched group and its contribution history:
//! the dashboard card and the group detail page.

use crate::aggregation::{aggregate_by_user, user_total, UserContributions};
use crate::domain::{Contribution, Group};
use crate::progress::{days_remaining, progress_percentage, rounded_percent, DeadlineStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Progress of some amount toward a group's target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub total: Decimal,
    /// Capped at 100; `None` when the target is not positive.
    pub percentage: Option<Decimal>,
    /// Uncapped, rounded to a whole percent.
    pub rounded_percent: Option<i64>,
}

impl Progress {
    pub fn new(total: Decimal, target: Decimal) -> Self {
        Self {
            total,
            percentage: progress_percentage(total, target),
            rounded_percent: rounded_percent(total, target),
        }
    }
}

/// What the dashboard shows for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCard {
    pub group: Group,
    pub member_count: usize,
    pub my_progress: Progress,
    pub days_remaining: i64,
    pub deadline: DeadlineStatus,
}

impl GroupCard {
    pub fn build(
        group: Group,
        contributions: &[Contribution],
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        let days = days_remaining(group.target_date, now);
        Self {
            member_count: group.members.len(),
            my_progress: Progress::new(user_total(contributions, user_id), group.target_amount),
            days_remaining: days,
            deadline: DeadlineStatus::from_days(days),
            group,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberProgress {
    pub member: UserContributions,
    pub progress: Progress,
}

/// What the group page shows: the caller's progress, every contributor's
/// progress, and the full history newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDetail {
    pub card: GroupCard,
    pub members: Vec<MemberProgress>,
    pub history: Vec<Contribution>,
}

impl GroupDetail {
    pub fn build(
        group: Group,
        history: Vec<Contribution>,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        let target = group.target_amount;
        let members = aggregate_by_user(&history)
            .into_vec()
            .into_iter()
            .map(|member| MemberProgress {
                progress: Progress::new(member.total, target),
                member,
            })
            .collect();

        Self {
            card: GroupCard::build(group, &history, user_id, now),
            members,
            history,
        }
    }
}
