//! Handlers for the `/auth` resource (role sign-in, current user).

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use schoolhub_core::error::CoreError;
use schoolhub_core::gateway::GatewayError;
use schoolhub_core::roles::validate_role;
use schoolhub_core::types::DbId;

use crate::auth::jwt::generate_access_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login/{role}`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful sign-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
    pub fullname: String,
    pub role: String,
    pub picture_url: Option<String>,
}

/// The caller as seen through their token.
#[derive(Debug, Serialize)]
pub struct CurrentUser {
    pub id: DbId,
    pub name: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login/{role}
///
/// Check the credentials against the LMS and issue a session token carrying
/// the chosen role.
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    validate_role(&role)?;
    input.validate()?;

    // The LMS rejecting credentials is a sign-in failure, not an outage.
    let user = state
        .auth
        .authenticate(&input.username, &input.password)
        .await
        .map_err(|e| match e {
            GatewayError::Remote { message } if !message.is_empty() => {
                AppError::Core(CoreError::Unauthorized(message))
            }
            other => AppError::Gateway(other),
        })?;

    let access_token =
        generate_access_token(user.id, &role, &user.fullname, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, username = %user.username, role = %role, "User signed in");

    Ok(Json(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            username: user.username,
            fullname: user.fullname,
            role,
            picture_url: user.picture_url,
        },
    }))
}

/// GET /api/v1/auth/me
pub async fn me(user: AuthUser) -> Json<DataResponse<CurrentUser>> {
    Json(DataResponse {
        data: CurrentUser {
            id: user.user_id,
            name: user.name,
            role: user.role,
        },
    })
}
