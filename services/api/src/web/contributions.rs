//! services/api/src/web/contributions.rs
//!
//! Endpoints for listing and adding contributions to a group.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use savings_core::domain::{normalize_description, Contribution, NewContribution};
use savings_core::validation::validate_new_contribution;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{ErrorBody, HandlerError};
use crate::web::groups::find_member_group;
use crate::web::state::{AppState, CurrentUser};

#[derive(Deserialize, ToSchema)]
pub struct AddContributionRequest {
    /// Decimal text as typed in the form, e.g. "12.5".
    pub amount: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContributionDto {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Contribution> for ContributionDto {
    fn from(c: Contribution) -> Self {
        Self {
            id: c.id,
            group_id: c.group_id,
            user_id: c.user_id,
            user_name: c.user_name,
            amount: c.amount,
            description: c.description,
            created_at: c.created_at,
        }
    }
}

/// List a group's contributions, newest first.
#[utoipa::path(
    get,
    path = "/groups/{id}/contributions",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 200, description = "Contribution history", body = [ContributionDto]),
        (status = 404, description = "Group not found among the caller's groups", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_contributions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<ContributionDto>>, HandlerError> {
    find_member_group(&state, user.user_id, group_id, "Failed to load contributions").await?;

    let history = state
        .db
        .get_contributions_for_group(group_id)
        .await
        .map_err(HandlerError::failed("Failed to load contributions"))?;

    Ok(Json(history.into_iter().map(ContributionDto::from).collect()))
}

/// Record a contribution by the caller.
#[utoipa::path(
    post,
    path = "/groups/{id}/contributions",
    params(("id" = Uuid, Path, description = "Group id")),
    request_body = AddContributionRequest,
    responses(
        (status = 201, description = "Contribution added", body = ContributionDto),
        (status = 400, description = "Invalid amount", body = ErrorBody),
        (status = 404, description = "Group not found among the caller's groups", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn add_contribution_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<AddContributionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let amount = validate_new_contribution(&req.amount)?;
    find_member_group(&state, user.user_id, group_id, "Failed to add contribution").await?;

    let contribution = state
        .db
        .create_contribution(NewContribution {
            group_id,
            user_id: user.user_id,
            user_name: user.contributor_name().to_string(),
            amount,
            description: normalize_description(req.description.as_deref()),
        })
        .await
        .map_err(HandlerError::failed("Failed to add contribution"))?;

    info!(%group_id, user_id = %user.user_id, "Contribution added");
    Ok((StatusCode::CREATED, Json(ContributionDto::from(contribution))))
}
