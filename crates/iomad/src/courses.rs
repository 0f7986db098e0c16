//! Course catalogue functions.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use schoolhub_core::course::Course;
use schoolhub_core::gateway::{CourseGateway, GatewayError};
use schoolhub_core::school::is_truthy;
use schoolhub_core::types::{DbId, UnixTime};

use crate::error::IomadError;
use crate::rpc::IomadClient;

pub const FN_GET_COURSES: &str = "core_course_get_courses";
pub const FN_GET_CATEGORIES: &str = "core_course_get_categories";

/// Format of the site front page, which Moodle lists as a course.
const SITE_FORMAT: &str = "site";

#[derive(Debug, Deserialize)]
struct RemoteCourse {
    id: DbId,
    #[serde(default)]
    fullname: String,
    #[serde(default)]
    shortname: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    categoryid: Option<DbId>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    startdate: Option<UnixTime>,
    #[serde(default)]
    enddate: Option<UnixTime>,
    #[serde(default)]
    visible: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RemoteCategory {
    id: DbId,
    name: String,
}

impl RemoteCourse {
    fn into_course(self, categories: &HashMap<DbId, String>) -> Course {
        Course {
            id: self.id,
            fullname: self.fullname,
            shortname: self.shortname,
            summary: self.summary.filter(|s| !s.is_empty()),
            category_name: self.categoryid.and_then(|id| categories.get(&id).cloned()),
            format: self.format,
            startdate: self.startdate.filter(|t| *t > 0),
            enddate: self.enddate.filter(|t| *t > 0),
            visible: self.visible.as_ref().map_or(true, is_truthy),
        }
    }
}

impl IomadClient {
    /// Courses by id, or every course when `ids` is empty. The site front
    /// page is never included.
    pub async fn get_courses(&self, ids: &[DbId]) -> Result<Vec<Course>, IomadError> {
        let params: Vec<(String, String)> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (format!("options[ids][{i}]"), id.to_string()))
            .collect();

        let remote: Vec<RemoteCourse> = self.call(Method::GET, FN_GET_COURSES, &params).await?;
        let categories = self.category_names().await;

        Ok(remote
            .into_iter()
            .filter(|c| c.format.as_deref() != Some(SITE_FORMAT))
            .map(|c| c.into_course(&categories))
            .collect())
    }

    /// Category id to name. Courses stay listable when categories are not
    /// readable, they just lose their category name.
    async fn category_names(&self) -> HashMap<DbId, String> {
        match self
            .call::<Vec<RemoteCategory>>(Method::GET, FN_GET_CATEGORIES, &[])
            .await
        {
            Ok(categories) => categories.into_iter().map(|c| (c.id, c.name)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load course categories");
                HashMap::new()
            }
        }
    }
}

#[async_trait]
impl CourseGateway for IomadClient {
    async fn list_courses(&self) -> Result<Vec<Course>, GatewayError> {
        Ok(self.get_courses(&[]).await?)
    }

    async fn get_course(&self, id: DbId) -> Result<Course, GatewayError> {
        let course = self
            .get_courses(&[id])
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(IomadError::NotFound {
                entity: "Course",
                id,
            })?;
        Ok(course)
    }
}
