//! Course view model and the category choices offered for filtering.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, UnixTime};

/// Length of the plain-text summary excerpt shown on course cards.
pub const EXCERPT_LEN: usize = 120;

/// A course as shown in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: DbId,
    pub fullname: String,
    pub shortname: String,
    pub summary: Option<String>,
    pub category_name: Option<String>,
    pub format: Option<String>,
    pub startdate: Option<UnixTime>,
    pub enddate: Option<UnixTime>,
    pub visible: bool,
}

impl Course {
    /// Plain-text excerpt of the summary, if there is one.
    pub fn excerpt(&self) -> Option<String> {
        self.summary.as_deref().map(|s| excerpt(s, EXCERPT_LEN))
    }
}

fn html_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

/// Remove HTML tags from a course summary.
pub fn strip_html(html: &str) -> String {
    html_tag().replace_all(html, "").into_owned()
}

/// Strip tags and cut to at most `max_chars` characters.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    strip_html(html).chars().take(max_chars).collect()
}

/// A category choice in the course filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CourseCategory {
    /// Filter key; `all` disables category filtering.
    pub id: &'static str,
    pub name: &'static str,
}

/// The fixed category choices, `all` first.
pub const COURSE_CATEGORIES: &[CourseCategory] = &[
    CourseCategory { id: "all", name: "All Courses" },
    CourseCategory { id: "teaching", name: "Teaching Skills" },
    CourseCategory { id: "assessment", name: "Assessment" },
    CourseCategory { id: "leadership", name: "Leadership" },
    CourseCategory { id: "technology", name: "Technology" },
];
