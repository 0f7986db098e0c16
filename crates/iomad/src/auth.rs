//! User sign-in against the LMS.
//!
//! Credentials are exchanged for a per-user token at `login/token.php`; the
//! token is then used once to read the user's identity from
//! `core_webservice_get_site_info`. The user token is not kept.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use schoolhub_core::gateway::{AuthGateway, GatewayError, LmsUser};
use schoolhub_core::types::DbId;

use crate::error::IomadError;
use crate::rpc::IomadClient;

pub const TOKEN_PATH: &str = "/login/token.php";
pub const FN_SITE_INFO: &str = "core_webservice_get_site_info";

/// Identity fields of `core_webservice_get_site_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteInfo {
    pub userid: DbId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub userpictureurl: Option<String>,
    #[serde(default)]
    pub sitename: String,
}

impl From<SiteInfo> for LmsUser {
    fn from(info: SiteInfo) -> Self {
        Self {
            id: info.userid,
            username: info.username,
            fullname: info.fullname,
            firstname: info.firstname,
            lastname: info.lastname,
            picture_url: info.userpictureurl.filter(|u| !u.is_empty()),
        }
    }
}

impl IomadClient {
    /// Exchange credentials for a user token.
    pub async fn login_token(&self, username: &str, password: &str) -> Result<String, IomadError> {
        let form = [
            ("username", username),
            ("password", password),
            ("service", self.service()),
        ];
        let response = self
            .http
            .post(self.url(TOKEN_PATH))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body).map_err(|_| {
            if status.is_success() {
                IomadError::invalid(TOKEN_PATH, "response body is not JSON")
            } else {
                IomadError::Status {
                    status: status.as_u16(),
                    body: body.clone(),
                }
            }
        })?;

        token_from(value)
    }

    /// Identity of the account owning `user_token`.
    pub async fn site_info(&self, user_token: &str) -> Result<SiteInfo, IomadError> {
        let value = self
            .call_with_token(user_token, Method::GET, FN_SITE_INFO, &[])
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Token from a `login/token.php` answer; its `error` field otherwise.
fn token_from(value: Value) -> Result<String, IomadError> {
    if let Some(token) = value.get("token").and_then(Value::as_str) {
        if !token.is_empty() {
            return Ok(token.to_string());
        }
    }
    match value.get("error").and_then(Value::as_str) {
        Some(message) => Err(IomadError::Exception {
            wsfunction: TOKEN_PATH.to_string(),
            exception: value
                .get("exception")
                .and_then(Value::as_str)
                .unwrap_or("moodle_exception")
                .to_string(),
            errorcode: value
                .get("errorcode")
                .and_then(Value::as_str)
                .map(str::to_string),
            message: message.to_string(),
        }),
        None => Err(IomadError::invalid(TOKEN_PATH, "neither token nor error in response")),
    }
}

#[async_trait]
impl AuthGateway for IomadClient {
    async fn authenticate(&self, username: &str, password: &str) -> Result<LmsUser, GatewayError> {
        let token = self.login_token(username, password).await?;
        let info = self.site_info(&token).await?;
        tracing::info!(user_id = info.userid, username = %info.username, "LMS sign-in succeeded");
        Ok(info.into())
    }
}
