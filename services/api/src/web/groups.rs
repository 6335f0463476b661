//! services/api/src/web/groups.rs
//!
//! Endpoints for the dashboard, group creation, joining and the group page.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use savings_core::domain::Group;
use savings_core::ports::PortError;
use savings_core::progress::DeadlineStatus;
use savings_core::summary::{GroupCard, GroupDetail, MemberProgress, Progress};
use savings_core::validation::{validate_new_group, GroupForm};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::contributions::ContributionDto;
use crate::web::dashboard::load_dashboard;
use crate::web::error::{ErrorBody, HandlerError};
use crate::web::state::{AppState, CurrentUser};

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    /// Decimal text as typed in the form, e.g. "1000".
    pub target_amount: String,
    /// `YYYY-MM-DD`.
    pub target_date: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
    pub members: Vec<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Group> for GroupDto {
    fn from(g: Group) -> Self {
        Self {
            id: g.id,
            name: g.name,
            description: g.description,
            target_amount: g.target_amount,
            target_date: g.target_date,
            members: g.members,
            created_by: g.created_by,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressDto {
    pub total: Decimal,
    /// Percent of the target, capped at 100. Null when the target is not positive.
    pub percentage: Option<Decimal>,
    /// Whole percent for labels, not capped.
    pub rounded_percent: Option<i64>,
}

impl From<Progress> for ProgressDto {
    fn from(p: Progress) -> Self {
        Self {
            total: p.total,
            percentage: p.percentage,
            rounded_percent: p.rounded_percent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineState {
    Remaining,
    Urgent,
    Expired,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeadlineDto {
    pub days_remaining: i64,
    pub state: DeadlineState,
}

impl DeadlineDto {
    fn new(days_remaining: i64, status: DeadlineStatus) -> Self {
        let state = match status {
            DeadlineStatus::Remaining(_) => DeadlineState::Remaining,
            DeadlineStatus::Urgent(_) => DeadlineState::Urgent,
            DeadlineStatus::Expired => DeadlineState::Expired,
        };
        Self {
            days_remaining,
            state,
        }
    }
}

/// One dashboard entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupCardDto {
    pub group: GroupDto,
    pub member_count: usize,
    pub my_progress: ProgressDto,
    pub deadline: DeadlineDto,
}

impl From<GroupCard> for GroupCardDto {
    fn from(card: GroupCard) -> Self {
        Self {
            deadline: DeadlineDto::new(card.days_remaining, card.deadline),
            member_count: card.member_count,
            my_progress: card.my_progress.into(),
            group: card.group.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberProgressDto {
    pub user_id: Uuid,
    pub user_name: String,
    pub progress: ProgressDto,
    pub contributions: Vec<ContributionDto>,
}

impl From<MemberProgress> for MemberProgressDto {
    fn from(m: MemberProgress) -> Self {
        Self {
            user_id: m.member.user_id,
            user_name: m.member.user_name,
            progress: m.progress.into(),
            contributions: m
                .member
                .contributions
                .into_iter()
                .map(ContributionDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GroupDetailDto {
    pub group: GroupDto,
    pub member_count: usize,
    pub my_progress: ProgressDto,
    pub deadline: DeadlineDto,
    /// Contributors in order of their latest contribution.
    pub members: Vec<MemberProgressDto>,
    /// Every contribution, newest first.
    pub history: Vec<ContributionDto>,
}

impl From<GroupDetail> for GroupDetailDto {
    fn from(detail: GroupDetail) -> Self {
        let card = GroupCardDto::from(detail.card);
        Self {
            group: card.group,
            member_count: card.member_count,
            my_progress: card.my_progress,
            deadline: card.deadline,
            members: detail.members.into_iter().map(Into::into).collect(),
            history: detail.history.into_iter().map(Into::into).collect(),
        }
    }
}

//=========================================================================================
// Lookup Helper
//=========================================================================================

/// Finds `group_id` among the groups `user_id` belongs to.
///
/// A group outside that set answers 404, whether or not it exists.
pub async fn find_member_group(
    state: &AppState,
    user_id: Uuid,
    group_id: Uuid,
    action: &'static str,
) -> Result<Group, HandlerError> {
    state
        .db
        .get_groups_for_member(user_id)
        .await
        .map_err(HandlerError::failed(action))?
        .into_iter()
        .find(|g| g.id == group_id)
        .ok_or(HandlerError::NotFound("Group not found"))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// The caller's groups, newest first, with their own progress in each.
#[utoipa::path(
    get,
    path = "/groups",
    responses(
        (status = 200, description = "Dashboard cards", body = [GroupCardDto]),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_groups_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<GroupCardDto>>, HandlerError> {
    let cancel = CancellationToken::new();
    let _abandon_on_drop = cancel.clone().drop_guard();

    let cards = load_dashboard(state.db.as_ref(), user.user_id, Utc::now(), &cancel)
        .await
        .map_err(|e| {
            error!("Failed to load groups: {:?}", e);
            HandlerError::Failed("Failed to load groups")
        })?;

    Ok(Json(cards.into_iter().map(GroupCardDto::from).collect()))
}

/// Create a group whose only member is the caller.
#[utoipa::path(
    post,
    path = "/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupDto),
        (status = 400, description = "Invalid form fields", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let new_group = validate_new_group(
        &GroupForm {
            name: &req.name,
            target_amount: &req.target_amount,
            target_date: &req.target_date,
            description: req.description.as_deref(),
        },
        Utc::now(),
    )?;

    let group = state
        .db
        .create_group(new_group, user.user_id)
        .await
        .map_err(HandlerError::failed("Failed to create group"))?;

    info!(group_id = %group.id, user_id = %user.user_id, "Group created");
    Ok((StatusCode::CREATED, Json(GroupDto::from(group))))
}

/// The group page: everyone's progress and the full history.
#[utoipa::path(
    get,
    path = "/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group detail", body = GroupDetailDto),
        (status = 404, description = "Group not found among the caller's groups", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn get_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetailDto>, HandlerError> {
    let group = find_member_group(&state, user.user_id, group_id, "Failed to load group").await?;

    let history = state
        .db
        .get_contributions_for_group(group_id)
        .await
        .map_err(HandlerError::failed("Failed to load contributions"))?;

    let detail = GroupDetail::build(group, history, user.user_id, Utc::now());
    Ok(Json(detail.into()))
}

/// Add the caller to a group's members. Joining twice changes nothing.
#[utoipa::path(
    post,
    path = "/groups/{id}/join",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 204, description = "Caller is a member"),
        (status = 404, description = "No such group", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn join_group_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    state
        .db
        .join_group(group_id, user.user_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => HandlerError::NotFound("Group not found"),
            other => HandlerError::failed("Failed to join group")(other),
        })?;

    info!(%group_id, user_id = %user.user_id, "Joined group");
    Ok(StatusCode::NO_CONTENT)
}
