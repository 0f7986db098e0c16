//! Route definitions for the school creation wizard.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::school_drafts;
use crate::state::AppState;

/// Mounted at `/school-drafts`. Asset uploads accept bodies up to
/// `max_upload_bytes`.
///
/// ```text
/// POST   /                      -> create_draft
/// GET    /{id}                  -> get_draft
/// PATCH  /{id}                  -> update_draft
/// DELETE /{id}                  -> close_draft
/// POST   /{id}/next             -> next_step
/// POST   /{id}/back             -> previous_step
/// PUT    /{id}/theme            -> select_theme
/// PUT    /{id}/assets/{slot}    -> upload_asset
/// DELETE /{id}/assets/{slot}    -> remove_asset
/// POST   /{id}/submit           -> submit_draft
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(school_drafts::create_draft))
        .route(
            "/{id}",
            get(school_drafts::get_draft)
                .patch(school_drafts::update_draft)
                .delete(school_drafts::close_draft),
        )
        .route("/{id}/next", post(school_drafts::next_step))
        .route("/{id}/back", post(school_drafts::previous_step))
        .route("/{id}/theme", put(school_drafts::select_theme))
        .route(
            "/{id}/assets/{slot}",
            put(school_drafts::upload_asset)
                .delete(school_drafts::remove_asset)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{id}/submit", post(school_drafts::submit_draft))
}
