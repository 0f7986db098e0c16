//! Well-known role names for the login-by-role entry points.
//!
//! The role is chosen on the login screen (`/login/{role}`) and carried in
//! the session token. IOMAD itself decides what the account may do; these
//! roles only gate which parts of this backend a session can reach.

use crate::error::CoreError;

pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_TRAINER: &str = "trainer";
pub const ROLE_PRINCIPAL: &str = "principal";
pub const ROLE_CLUSTER_LEAD: &str = "cluster_lead";
pub const ROLE_ADMIN: &str = "admin";

/// Every role accepted by the login endpoint.
pub const ALL_ROLES: &[&str] = &[
    ROLE_TEACHER,
    ROLE_TRAINER,
    ROLE_PRINCIPAL,
    ROLE_CLUSTER_LEAD,
    ROLE_ADMIN,
];

/// Roles allowed to create and edit schools.
pub const SCHOOL_MANAGER_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CLUSTER_LEAD];

/// Validate a role name taken from the login path.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if ALL_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown role '{role}'. Must be one of: {}",
            ALL_ROLES.join(", ")
        )))
    }
}

/// Whether a role may manage schools (create, update).
pub fn can_manage_schools(role: &str) -> bool {
    SCHOOL_MANAGER_ROLES.contains(&role)
}
