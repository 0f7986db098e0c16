use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use schoolhub_core::error::CoreError;
use schoolhub_core::gateway::GatewayError;
use schoolhub_core::types::DbId;

/// Message returned when the LMS could not be reached or answered nonsense.
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "The learning platform could not be reached. Please try again.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`GatewayError`] for remote
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed call to the LMS.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// An LMS failure with a message already chosen for the user.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Report a gateway `NotFound` as a missing `entity` with `id`.
    pub fn from_lookup(err: GatewayError, entity: &'static str, id: DbId) -> Self {
        match err {
            GatewayError::NotFound => AppError::Core(CoreError::NotFound {
                entity,
                id: id.to_string(),
            }),
            other => AppError::Gateway(other),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect::<Vec<_>>()
            .join("; ");

        AppError::Core(CoreError::Validation(message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- LMS errors ---
            AppError::Gateway(err) => classify_gateway_error(err),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone()),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a gateway error into an HTTP status, error code, and message.
///
/// - Remote exceptions map to 502 with the LMS message verbatim.
/// - `NotFound` maps to 404.
/// - Transport and shape failures map to 502 with a generic message.
fn classify_gateway_error(err: &GatewayError) -> (StatusCode, &'static str, String) {
    match err {
        GatewayError::Remote { message } if !message.is_empty() => {
            (StatusCode::BAD_GATEWAY, "REMOTE_ERROR", message.clone())
        }
        GatewayError::NotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "LMS call failed");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                UPSTREAM_FAILURE_MESSAGE.to_string(),
            )
        }
    }
}
