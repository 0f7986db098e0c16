//! Handlers for the theme preset catalogue.

use axum::Json;
use serde::Serialize;

use schoolhub_core::themes::{available_themes, ThemeOption};

use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

/// A preset as shown in the theme picker.
#[derive(Debug, Serialize)]
pub struct ThemeCard {
    #[serde(flatten)]
    pub theme: ThemeOption,
    /// Features listed on the card.
    pub visible_features: &'static [&'static str],
    /// Count behind the "+N more" badge.
    pub hidden_feature_count: usize,
}

/// GET /api/v1/themes
pub async fn list_themes(RequireAuth(_user): RequireAuth) -> Json<DataResponse<Vec<ThemeCard>>> {
    let cards = available_themes()
        .iter()
        .map(|theme| ThemeCard {
            theme: *theme,
            visible_features: theme.visible_features(),
            hidden_feature_count: theme.hidden_feature_count(),
        })
        .collect();

    Json(DataResponse { data: cards })
}
