use std::sync::Arc;

use schoolhub_core::gateway::{AuthGateway, CompanyGateway, CourseGateway};

use crate::config::ServerConfig;
use crate::drafts::DraftStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc`. The LMS is reached only
/// through the gateway traits, so tests substitute in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub companies: Arc<dyn CompanyGateway>,
    pub courses: Arc<dyn CourseGateway>,
    pub auth: Arc<dyn AuthGateway>,
    /// Open creation wizards.
    pub drafts: Arc<DraftStore>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        companies: Arc<dyn CompanyGateway>,
        courses: Arc<dyn CourseGateway>,
        auth: Arc<dyn AuthGateway>,
    ) -> Self {
        let drafts = Arc::new(DraftStore::new(
            config.wizard_settings(),
            config.draft_limits(),
        ));
        Self {
            config: Arc::new(config),
            companies,
            courses,
            auth,
            drafts,
        }
    }
}
