//! crates/savings_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl User {
    /// The name snapshotted onto contributions: the display name, or the email
    /// when no display name was set.
    pub fn contributor_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub hashed_password: String,
}

impl UserCredentials {
    pub fn to_user(&self) -> User {
        User {
            user_id: self.user_id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A named shared savings goal with a per-member target amount and deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

/// The validated input for creating a group.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
}

/// A single recorded amount a member added toward a group's goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContribution {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Maps blank free text to `None`.
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}
