use axum::routing::get;
use axum::Router;

use crate::handlers::courses;
use crate::state::AppState;

/// Mounted at `/courses`.
///
/// ```text
/// GET /             -> list_courses
/// GET /categories   -> list_categories
/// GET /{id}         -> get_course
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list_courses))
        .route("/categories", get(courses::list_categories))
        .route("/{id}", get(courses::get_course))
}
