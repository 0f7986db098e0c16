//! Handlers for the `/schools` resource (IOMAD companies).
//!
//! Lists are fetched fresh on every request and filtered here; nothing is
//! cached between requests.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use validator::Validate;

use schoolhub_core::filter::ListView;
use schoolhub_core::school::{unix_to_date, CompanyRecord, CompanyUpdate, School};
use schoolhub_core::themes::find_theme;
use schoolhub_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireSchoolManager};
use crate::query::SearchParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// A company record with its card view and calendar expiry date.
#[derive(Debug, Serialize)]
pub struct SchoolDetail {
    #[serde(flatten)]
    pub record: CompanyRecord,
    pub card: School,
    pub valid_until: Option<chrono::NaiveDate>,
}

impl From<CompanyRecord> for SchoolDetail {
    fn from(record: CompanyRecord) -> Self {
        Self {
            card: School::from_record(&record),
            valid_until: unix_to_date(record.validto),
            record,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/schools?search=
pub async fn list_schools(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<ListResponse<School>>> {
    let schools = state.companies.list_companies().await?;
    let view = ListView::new(schools).with_search(params.search);

    Ok(Json(view.page().into()))
}

/// GET /api/v1/schools/{id}
pub async fn get_school(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SchoolDetail>>> {
    let record = state
        .companies
        .get_company(id)
        .await
        .map_err(|e| AppError::from_lookup(e, "School", id))?;

    Ok(Json(DataResponse { data: record.into() }))
}

/// PUT /api/v1/schools/{id}
///
/// Partial update; only the fields present in the body are sent.
pub async fn update_school(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CompanyUpdate>,
) -> AppResult<Json<DataResponse<SchoolDetail>>> {
    input.validate()?;
    if input.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    if let Some(theme) = &input.theme {
        find_theme(theme)?;
    }

    let record = state
        .companies
        .update_company(id, &input)
        .await
        .map_err(|e| AppError::from_lookup(e, "School", id))?;

    tracing::info!(school_id = id, user_id = user.user_id, "School updated");

    Ok(Json(DataResponse { data: record.into() }))
}

/// DELETE /api/v1/schools/{id}
pub async fn delete_school(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeleteResult>>> {
    let deleted = state
        .companies
        .delete_company(id)
        .await
        .map_err(|e| AppError::from_lookup(e, "School", id))?;

    tracing::info!(school_id = id, user_id = admin.user_id, deleted, "School delete requested");

    Ok(Json(DataResponse {
        data: DeleteResult { deleted },
    }))
}
