use axum::routing::get;
use axum::Router;

use crate::handlers::themes;
use crate::state::AppState;

/// Theme presets mounted at `/themes`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(themes::list_themes))
}
