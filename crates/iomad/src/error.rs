use schoolhub_core::gateway::GatewayError;
use schoolhub_core::types::DbId;

/// Errors from the IOMAD web-service layer.
#[derive(Debug, thiserror::Error)]
pub enum IomadError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx status without an exception body.
    #[error("IOMAD returned HTTP {status}: {body}")]
    Status {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered with an exception object.
    #[error("{wsfunction} raised {exception}: {message}")]
    Exception {
        wsfunction: String,
        exception: String,
        errorcode: Option<String>,
        message: String,
    },

    /// The response parsed but had none of the expected shapes.
    #[error("Invalid response from {wsfunction}: {detail}")]
    InvalidResponse { wsfunction: String, detail: String },

    /// A payload could not be decoded into the expected type.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: DbId },
}

impl IomadError {
    pub(crate) fn invalid(wsfunction: &str, detail: impl Into<String>) -> Self {
        Self::InvalidResponse {
            wsfunction: wsfunction.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<IomadError> for GatewayError {
    fn from(err: IomadError) -> Self {
        match err {
            IomadError::Exception { message, .. } => GatewayError::Remote { message },
            IomadError::Request(e) => {
                tracing::error!(error = %e, "IOMAD transport failure");
                GatewayError::Transport(e.to_string())
            }
            IomadError::Status { status, body } => {
                tracing::error!(status, body = %body, "IOMAD returned an error status");
                GatewayError::Transport(format!("HTTP {status}"))
            }
            IomadError::InvalidResponse { wsfunction, detail } => {
                tracing::warn!(%wsfunction, %detail, "Unrecognised IOMAD response");
                GatewayError::InvalidResponse(detail)
            }
            IomadError::Decode(e) => {
                tracing::warn!(error = %e, "Undecodable IOMAD response");
                GatewayError::InvalidResponse(e.to_string())
            }
            IomadError::NotFound { .. } => GatewayError::NotFound,
        }
    }
}
