//! Client for the IOMAD/Moodle REST web service.
//!
//! [`IomadClient`] implements the `schoolhub-core` gateway traits, so the
//! rest of the workspace never sees web-service function names or raw
//! response shapes.

pub mod auth;
pub mod companies;
pub mod courses;
pub mod error;
pub mod files;
pub mod rpc;

pub use error::IomadError;
pub use rpc::{IomadClient, IomadConfig};
