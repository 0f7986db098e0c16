//! Route definitions for sign-in.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Mounted at `/auth`.
///
/// ```text
/// POST /login/{role}  -> login
/// GET  /me            -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/{role}", post(auth::login))
        .route("/me", get(auth::me))
}
