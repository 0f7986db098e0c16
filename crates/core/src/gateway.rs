//! Seams between the domain and the remote LMS.
//!
//! Handlers and the creation wizard only ever talk to these traits. The
//! production implementation lives in `schoolhub-iomad`; tests substitute
//! in-memory fakes. Errors are already classified when they cross this
//! boundary, so callers never inspect raw response shapes.

use async_trait::async_trait;
use serde::Serialize;

use crate::assets::AssetFile;
use crate::course::Course;
use crate::school::{CompanyPayload, CompanyRecord, CompanyUpdate, School};
use crate::types::DbId;

/// Message shown when a remote failure carries no usable text.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to create school. Please check your permissions and try again.";

/// Classified failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The service answered with an exception object.
    #[error("{message}")]
    Remote { message: String },

    /// The request never produced a usable HTTP response.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response did not have any recognised shape.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The service reported no matching record.
    #[error("Not found")]
    NotFound,
}

impl GatewayError {
    /// Text suitable for showing to the user: the remote message verbatim,
    /// or a generic fallback for anything else.
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote { message } if !message.is_empty() => message.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Location where an uploaded file is filed on the LMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadTarget {
    pub contextid: DbId,
    pub component: String,
    pub filearea: String,
    pub itemid: DbId,
    pub filepath: String,
}

impl Default for UploadTarget {
    /// The user draft area of the system context.
    fn default() -> Self {
        Self {
            contextid: 1,
            component: "user".to_string(),
            filearea: "draft".to_string(),
            itemid: 0,
            filepath: "/".to_string(),
        }
    }
}

/// Company ("school") operations plus the file upload they depend on.
#[async_trait]
pub trait CompanyGateway: Send + Sync {
    /// Every company visible to the service account.
    async fn list_companies(&self) -> Result<Vec<School>, GatewayError>;

    async fn get_company(&self, id: DbId) -> Result<CompanyRecord, GatewayError>;

    async fn create_company(&self, payload: &CompanyPayload) -> Result<CompanyRecord, GatewayError>;

    async fn update_company(
        &self,
        id: DbId,
        update: &CompanyUpdate,
    ) -> Result<CompanyRecord, GatewayError>;

    /// Returns whether the service confirmed the deletion.
    async fn delete_company(&self, id: DbId) -> Result<bool, GatewayError>;

    /// Upload a file and return its URL on the LMS.
    async fn upload_file(
        &self,
        file: &AssetFile,
        target: &UploadTarget,
    ) -> Result<String, GatewayError>;
}

/// Course catalogue.
#[async_trait]
pub trait CourseGateway: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, GatewayError>;

    async fn get_course(&self, id: DbId) -> Result<Course, GatewayError>;
}

/// Identity of an account that signed in against the LMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LmsUser {
    pub id: DbId,
    pub username: String,
    pub fullname: String,
    pub firstname: String,
    pub lastname: String,
    pub picture_url: Option<String>,
}

/// Credential check against the LMS.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<LmsUser, GatewayError>;
}
