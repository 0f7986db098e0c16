//! Route definitions for schools (IOMAD companies).

use axum::routing::get;
use axum::Router;

use crate::handlers::schools;
use crate::state::AppState;

/// Mounted at `/schools`.
///
/// ```text
/// GET    /        -> list_schools
/// GET    /{id}    -> get_school
/// PUT    /{id}    -> update_school
/// DELETE /{id}    -> delete_school
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(schools::list_schools)).route(
        "/{id}",
        get(schools::get_school)
            .put(schools::update_school)
            .delete(schools::delete_school),
    )
}
