//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?search=` on list endpoints. Absent and empty both mean no filtering.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

/// `?search=&category=` on the course list. `category=all` disables the
/// category filter.
#[derive(Debug, Default, Deserialize)]
pub struct CourseListParams {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
}
