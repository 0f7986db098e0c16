pub mod auth;
pub mod courses;
pub mod health;
pub mod school_drafts;
pub mod schools;
pub mod themes;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login/{role}                          sign in with LMS credentials (public)
/// /auth/me                                    current user
///
/// /themes                                     theme presets
///
/// /schools                                    list (?search)
/// /schools/{id}                               get, update, delete
///
/// /courses                                    list (?search, ?category)
/// /courses/categories                         category choices
/// /courses/{id}                               get
///
/// /school-drafts                              open a creation wizard (POST)
/// /school-drafts/{id}                         get, edit (PATCH), close (DELETE)
/// /school-drafts/{id}/next                    advance a step (POST)
/// /school-drafts/{id}/back                    go back a step (POST)
/// /school-drafts/{id}/theme                   select theme (PUT)
/// /school-drafts/{id}/assets/{slot}           stage (PUT, multipart), remove (DELETE)
/// /school-drafts/{id}/submit                  create the school (POST)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/themes", themes::router())
        .nest("/schools", schools::router())
        .nest("/courses", courses::router())
        .nest(
            "/school-drafts",
            school_drafts::router(config.upload_body_limit()),
        )
}
