//! Shared primitive types.

/// Numeric identifier issued by the remote LMS (companies, courses, users).
pub type DbId = i64;

/// Unix timestamp in seconds, as used by the Moodle web service.
pub type UnixTime = i64;
