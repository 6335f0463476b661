//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, logout and the current user.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use savings_core::domain::{AuthSession, User};
use savings_core::ports::PortError;
use savings_core::validation::{validate_login, validate_registration, RegistrationForm};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::web::error::{ErrorBody, HandlerError};
use crate::web::middleware::{session_id_from_headers, SESSION_COOKIE};
use crate::web::state::{AppState, CurrentUser};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

impl From<User> for AuthResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
        }
    }
}

//=========================================================================================
// Session Helpers
//=========================================================================================

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn session_cookie(config: &Config, value: &str, max_age_secs: i64) -> String {
    let secure = if config.cookie_secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, value, secure, max_age_secs
    )
}

/// Opens a login session for `user_id` and returns the `Set-Cookie` value.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, HandlerError> {
    let session = AuthSession {
        id: Uuid::new_v4().to_string(),
        user_id,
        expires_at: Utc::now() + state.config.session_ttl,
    };

    state
        .db
        .create_auth_session(&session)
        .await
        .map_err(HandlerError::failed("Failed to create session"))?;

    Ok(session_cookie(
        &state.config,
        &session.id,
        state.config.session_ttl.num_seconds(),
    ))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid form fields", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let email = normalize_email(&req.email);
    validate_registration(&RegistrationForm {
        display_name: &req.display_name,
        email: &email,
        password: &req.password,
        confirm_password: &req.confirm_password,
    })?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            HandlerError::Failed("Failed to create account")
        })?
        .to_string();

    // 2. Create user in database
    let user = state
        .db
        .create_user(&email, req.display_name.trim(), &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HandlerError::Conflict("Email already registered"),
            other => HandlerError::failed("Failed to create account")(other),
        })?;

    // 3. Sign the new user in
    let cookie = start_session(&state, user.user_id).await?;
    info!(user_id = %user.user_id, "Account created");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(user)),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid form fields", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let email = normalize_email(&req.email);
    validate_login(&email, &req.password)?;

    // 1. Get user by email
    let user_creds = state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => HandlerError::Unauthorized("Invalid email or password"),
            other => HandlerError::failed("Failed to sign in")(other),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        HandlerError::Failed("Authentication error")
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err(HandlerError::Unauthorized("Invalid email or password"));
    }

    // 3. Open the session
    let cookie = start_session(&state, user_creds.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse::from(user_creds.to_user())),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session", body = ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let auth_session_id =
        session_id_from_headers(&headers).ok_or(HandlerError::Unauthorized("No session found"))?;

    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(HandlerError::failed("Failed to logout"))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state.config, "", 0))],
    ))
}

/// GET /me - The signed-in user
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn me_handler(Extension(user): Extension<CurrentUser>) -> Json<AuthResponse> {
    Json(AuthResponse::from(user.0))
}
