//! Handlers for the `/school-drafts` resource: the school creation wizard.
//!
//! A draft is opened with `POST`, edited step by step, and either submitted
//! or closed. Every response carries the full wizard snapshot so the client
//! can render the current step, previews, error and success message.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use schoolhub_core::assets::{AssetFile, AssetSlot};
use schoolhub_core::error::CoreError;
use schoolhub_core::gateway::GatewayError;
use schoolhub_core::wizard::{DraftChanges, DraftView, SchoolWizard, SubmitError, Submission};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSchoolManager;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A wizard snapshot with the draft id.
#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: DraftView,
}

/// Request body for `PUT /school-drafts/{id}/theme`.
#[derive(Debug, Deserialize)]
pub struct SelectThemeRequest {
    pub theme: String,
}

type DraftResult = AppResult<Json<DataResponse<DraftResponse>>>;

fn respond(id: Uuid, wizard: &SchoolWizard) -> Json<DataResponse<DraftResponse>> {
    Json(DataResponse {
        data: DraftResponse {
            id,
            view: wizard.view(),
        },
    })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/school-drafts
pub async fn create_draft(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftResponse>>)> {
    let (id, handle) = state.drafts.open(user.user_id).await;
    let wizard = handle.lock().await;

    tracing::info!(draft_id = %id, user_id = user.user_id, "School creation started");

    Ok((StatusCode::CREATED, respond(id, &wizard)))
}

/// GET /api/v1/school-drafts/{id}
pub async fn get_draft(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DraftResult {
    let handle = state.drafts.get(id, user.user_id).await?;
    let wizard = handle.lock().await;
    Ok(respond(id, &wizard))
}

/// DELETE /api/v1/school-drafts/{id}
///
/// Cancel: reset every field and discard the draft. Refused with 409 while
/// the draft is being submitted.
pub async fn close_draft(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let handle = state.drafts.remove(id, user.user_id).await?;
    handle.lock().await.close();

    tracing::info!(draft_id = %id, user_id = user.user_id, "School creation cancelled");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// PATCH /api/v1/school-drafts/{id}
pub async fn update_draft(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<DraftChanges>,
) -> DraftResult {
    let handle = state.drafts.get(id, user.user_id).await?;
    let mut wizard = handle.lock().await;
    wizard.apply_changes(changes);
    Ok(respond(id, &wizard))
}

/// PUT /api/v1/school-drafts/{id}/theme
pub async fn select_theme(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SelectThemeRequest>,
) -> DraftResult {
    let handle = state.drafts.get(id, user.user_id).await?;
    let mut wizard = handle.lock().await;
    wizard.select_theme(&input.theme)?;
    Ok(respond(id, &wizard))
}

/// PUT /api/v1/school-drafts/{id}/assets/{slot}
///
/// Multipart form with a required `file` field. The file is validated and
/// previewed locally; it is uploaded to the LMS only on submit.
pub async fn upload_asset(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
    mut multipart: Multipart,
) -> DraftResult {
    let slot = AssetSlot::parse(&slot)?;
    let handle = state.drafts.get(id, user.user_id).await?;

    let mut file: Option<AssetFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or(slot.as_str()).to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some(AssetFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let file = file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let size = file.bytes.len();

    let mut wizard = handle.lock().await;
    wizard.select_asset(slot, file)?;

    tracing::info!(draft_id = %id, slot = slot.as_str(), size, "Asset staged");

    Ok(respond(id, &wizard))
}

/// DELETE /api/v1/school-drafts/{id}/assets/{slot}
pub async fn remove_asset(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, String)>,
) -> DraftResult {
    let slot = AssetSlot::parse(&slot)?;
    let handle = state.drafts.get(id, user.user_id).await?;
    let mut wizard = handle.lock().await;
    wizard.remove_asset(slot);
    Ok(respond(id, &wizard))
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// POST /api/v1/school-drafts/{id}/next
///
/// Leaving step 1 requires name, short name, city and country.
pub async fn next_step(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DraftResult {
    let handle = state.drafts.get(id, user.user_id).await?;
    let mut wizard = handle.lock().await;

    if !wizard.next() {
        if let Some(message) = wizard.error() {
            return Err(AppError::Core(CoreError::Validation(message.to_string())));
        }
    }
    Ok(respond(id, &wizard))
}

/// POST /api/v1/school-drafts/{id}/back
pub async fn previous_step(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DraftResult {
    let handle = state.drafts.get(id, user.user_id).await?;
    let mut wizard = handle.lock().await;
    wizard.back();
    Ok(respond(id, &wizard))
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// POST /api/v1/school-drafts/{id}/submit
///
/// Upload staged assets, create the company, and discard the draft. On any
/// failure the draft stays open with its error set, ready for a retry.
///
/// The submission runs on its own task and completes even if this request
/// times out or the client goes away.
pub async fn submit_draft(
    RequireSchoolManager(user): RequireSchoolManager,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<DataResponse<Submission>>)> {
    let user_id = user.user_id;
    let handle = state.drafts.begin_submit(id, user_id).await?;

    let drafts = Arc::clone(&state.drafts);
    let companies = Arc::clone(&state.companies);
    let task = tokio::spawn(async move {
        let mut wizard = handle.lock().await;
        let result = wizard
            .submit(companies.as_ref(), |school| {
                tracing::info!(
                    draft_id = %id,
                    school_id = %school.id,
                    name = %school.name,
                    user_id,
                    "School created from draft"
                );
            })
            .await;
        drafts.finish_submit(id, result.is_ok()).await;
        result
    });

    let submission = match task.await {
        Ok(result) => result.map_err(submit_error)?,
        Err(err) => {
            state.drafts.finish_submit(id, false).await;
            tracing::error!(draft_id = %id, error = %err, "Submission task failed");
            return Err(AppError::InternalError(format!("Submission task failed: {err}")));
        }
    };

    for warning in &submission.warnings {
        tracing::warn!(draft_id = %id, slot = warning.slot.as_str(), "{}", warning.message);
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}

fn submit_error(err: SubmitError) -> AppError {
    match err {
        SubmitError::NotOpen => AppError::BadRequest(err.to_string()),
        SubmitError::Invalid(message) => AppError::Core(CoreError::Validation(message)),
        SubmitError::Remote(GatewayError::Remote { message }) if !message.is_empty() => {
            AppError::Gateway(GatewayError::Remote { message })
        }
        SubmitError::Remote(other) => AppError::Upstream(other.user_message()),
    }
}
