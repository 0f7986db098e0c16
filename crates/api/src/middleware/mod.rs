//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the signed-in user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireSchoolManager`] -- Requires `admin` or `cluster_lead`.
//! - [`rbac::RequireAuth`] -- Requires any signed-in user.

pub mod auth;
pub mod rbac;
