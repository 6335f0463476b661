//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the
//! liveness endpoint.

use utoipa::OpenApi;

use crate::web::{auth, contributions, error, groups};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        groups::list_groups_handler,
        groups::create_group_handler,
        groups::get_group_handler,
        groups::join_group_handler,
        contributions::list_contributions_handler,
        contributions::add_contribution_handler,
        health_handler,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            groups::CreateGroupRequest,
            groups::GroupDto,
            groups::GroupCardDto,
            groups::GroupDetailDto,
            groups::MemberProgressDto,
            groups::ProgressDto,
            groups::DeadlineDto,
            groups::DeadlineState,
            contributions::AddContributionRequest,
            contributions::ContributionDto,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "Savings Tracker API", description = "Shared savings groups and their contributions.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}
