//! Domain logic for the SchoolHub administration backend.
//!
//! Everything in this crate is free of HTTP concerns: the school draft
//! record and its creation wizard, theme presets, asset staging, list
//! filtering, view models, and the gateway traits through which the
//! remote IOMAD service is reached.

pub mod assets;
pub mod course;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod roles;
pub mod school;
pub mod themes;
pub mod types;
pub mod wizard;
