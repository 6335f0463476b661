pub mod aggregation;
pub mod domain;
pub mod ports;
pub mod progress;
pub mod summary;
pub mod validation;

pub use aggregation::{aggregate_by_user, user_total, ContributionsByUser, UserContributions};
pub use domain::{
    AuthSession, Contribution, Group, NewContribution, NewGroup, User, UserCredentials,
};
pub use ports::{DatabaseService, PortError, PortResult};
pub use progress::{days_remaining, progress_percentage, rounded_percent, DeadlineStatus};
pub use summary::{GroupCard, GroupDetail, MemberProgress, Progress};
pub use validation::FieldErrors;
