//! REST client for the Moodle/IOMAD web-service endpoint.
//!
//! Every function is reached through `{base_url}/webservice/rest/server.php`
//! with `wstoken`, `wsfunction` and `moodlewsrestformat=json` in the query
//! string. Moodle reports failures as an exception object, usually with HTTP
//! 200, so each response is classified into [`WsResponse`] before any caller
//! sees it.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::IomadError;

/// Path of the REST server script below the site root.
pub const REST_PATH: &str = "/webservice/rest/server.php";

/// Default external service used for user logins.
pub const DEFAULT_SERVICE: &str = "moodle_mobile_app";

/// Connection settings for one IOMAD site.
#[derive(Debug, Clone)]
pub struct IomadConfig {
    /// Site root, e.g. `https://lms.example.org`.
    pub base_url: String,
    /// Web-service token of the administrative service account.
    pub token: String,
    /// External service name passed to `login/token.php`.
    pub service: String,
    /// Overall request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

/// Classified web-service response.
#[derive(Debug, Clone, PartialEq)]
pub enum WsResponse<T> {
    Exception(WsException),
    Payload(T),
}

/// An exception object returned in place of a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsException {
    pub exception: String,
    pub errorcode: Option<String>,
    pub message: String,
}

impl WsResponse<Value> {
    /// Split a decoded body into exception or payload. Any object carrying
    /// an `exception` key is an exception, whatever its value.
    pub fn classify(value: Value) -> Self {
        match value.get("exception") {
            Some(exception) => {
                let exception = match exception {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Self::Exception(WsException {
                    exception,
                    errorcode: value
                        .get("errorcode")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    message: value
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })
            }
            None => Self::Payload(value),
        }
    }
}

impl<T> WsResponse<T> {
    pub fn into_result(self, wsfunction: &str) -> Result<T, IomadError> {
        match self {
            Self::Payload(v) => Ok(v),
            Self::Exception(e) => Err(IomadError::Exception {
                wsfunction: wsfunction.to_string(),
                exception: e.exception,
                errorcode: e.errorcode,
                message: e.message,
            }),
        }
    }
}

/// HTTP client for a single IOMAD site.
#[derive(Debug, Clone)]
pub struct IomadClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    token: String,
    service: String,
}

impl IomadClient {
    /// Build a client with its own connection pool.
    pub fn new(config: &IomadConfig) -> Result<Self, IomadError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, config))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, config: &IomadConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            service: config.service.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Query parameters that select a function with the service token.
    pub(crate) fn function_query<'a>(&'a self, wsfunction: &'a str) -> [(&'a str, &'a str); 3] {
        ws_query(&self.token, wsfunction)
    }

    /// Call a function and decode its payload into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        wsfunction: &str,
        params: &[(String, String)],
    ) -> Result<T, IomadError> {
        let value = self.call_raw(method, wsfunction, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Call a function with the service token and return the raw payload.
    pub async fn call_raw(
        &self,
        method: Method,
        wsfunction: &str,
        params: &[(String, String)],
    ) -> Result<Value, IomadError> {
        self.call_with_token(&self.token, method, wsfunction, params)
            .await
    }

    /// Call a function on behalf of another token (e.g. a signed-in user).
    pub async fn call_with_token(
        &self,
        token: &str,
        method: Method,
        wsfunction: &str,
        params: &[(String, String)],
    ) -> Result<Value, IomadError> {
        tracing::debug!(%wsfunction, %method, "Calling IOMAD web service");

        let response = self
            .http
            .request(method, self.url(REST_PATH))
            .query(&ws_query(token, wsfunction))
            .query(params)
            .send()
            .await?;

        decode_response(wsfunction, response).await
    }
}

fn ws_query<'a>(token: &'a str, wsfunction: &'a str) -> [(&'a str, &'a str); 3] {
    [
        ("wstoken", token),
        ("wsfunction", wsfunction),
        ("moodlewsrestformat", "json"),
    ]
}

/// Read a response body and classify it.
///
/// An empty body is a `null` payload (several write functions return
/// nothing). An exception body wins over the HTTP status; a non-2xx status
/// without one becomes [`IomadError::Status`].
pub(crate) async fn decode_response(
    wsfunction: &str,
    response: reqwest::Response,
) -> Result<Value, IomadError> {
    let status = response.status();
    let body = response.text().await?;

    let parsed = if body.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str::<Value>(&body).ok()
    };

    match parsed.map(WsResponse::classify) {
        Some(WsResponse::Exception(e)) => WsResponse::<Value>::Exception(e).into_result(wsfunction),
        Some(WsResponse::Payload(value)) if status.is_success() => Ok(value),
        _ if !status.is_success() => Err(IomadError::Status {
            status: status.as_u16(),
            body,
        }),
        _ => Err(IomadError::invalid(wsfunction, "response body is not JSON")),
    }
}

/// Encode a value as the JSON string Moodle expects for structured params.
pub(crate) fn json_param<T: serde::Serialize>(value: &T) -> Result<String, IomadError> {
    Ok(serde_json::to_string(value)?)
}
