//! Handlers for the course catalogue.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use schoolhub_core::course::{Course, CourseCategory, COURSE_CATEGORIES};
use schoolhub_core::filter::{CategoryFilter, ListView};
use schoolhub_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::CourseListParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// A course with its plain-text summary excerpt.
#[derive(Debug, Serialize)]
pub struct CourseCard {
    #[serde(flatten)]
    pub course: Course,
    pub excerpt: Option<String>,
}

impl From<Course> for CourseCard {
    fn from(course: Course) -> Self {
        Self {
            excerpt: course.excerpt(),
            course,
        }
    }
}

/// GET /api/v1/courses?search=&category=
pub async fn list_courses(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<CourseListParams>,
) -> AppResult<Json<ListResponse<CourseCard>>> {
    let courses = state.courses.list_courses().await?;
    let view = ListView::new(courses)
        .with_search(params.search)
        .with_category(CategoryFilter::parse(&params.category));

    let page: ListResponse<Course> = view.page().into();
    Ok(Json(page.map(CourseCard::from)))
}

/// GET /api/v1/courses/categories
pub async fn list_categories(
    RequireAuth(_user): RequireAuth,
) -> Json<DataResponse<&'static [CourseCategory]>> {
    Json(DataResponse {
        data: COURSE_CATEGORIES,
    })
}

/// GET /api/v1/courses/{id}
pub async fn get_course(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseCard>>> {
    let course = state
        .courses
        .get_course(id)
        .await
        .map_err(|e| AppError::from_lookup(e, "Course", id))?;

    Ok(Json(DataResponse { data: course.into() }))
}
