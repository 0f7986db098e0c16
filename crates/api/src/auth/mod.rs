//! Session tokens issued after an LMS sign-in.

pub mod jwt;
