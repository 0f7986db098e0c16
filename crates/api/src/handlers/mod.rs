pub mod auth;
pub mod courses;
pub mod school_drafts;
pub mod schools;
pub mod themes;
