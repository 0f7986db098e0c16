//! File upload into a Moodle file area.

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use schoolhub_core::assets::AssetFile;
use schoolhub_core::gateway::UploadTarget;

use crate::error::IomadError;
use crate::rpc::{decode_response, IomadClient, REST_PATH};

pub const FN_UPLOAD: &str = "core_files_upload";

impl IomadClient {
    /// Upload a file as multipart form data and return its URL.
    pub async fn upload_draft_file(
        &self,
        file: &AssetFile,
        target: &UploadTarget,
    ) -> Result<String, IomadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)?;

        let form = Form::new()
            .part("file", part)
            .text("contextid", target.contextid.to_string())
            .text("component", target.component.clone())
            .text("filearea", target.filearea.clone())
            .text("itemid", target.itemid.to_string())
            .text("filepath", target.filepath.clone())
            .text("filename", file.filename.clone());

        tracing::debug!(
            filename = %file.filename,
            size = file.bytes.len(),
            filearea = %target.filearea,
            "Uploading file to IOMAD"
        );

        let response = self
            .http
            .post(self.url(REST_PATH))
            .query(&self.function_query(FN_UPLOAD))
            .multipart(form)
            .send()
            .await?;

        let value = decode_response(FN_UPLOAD, response).await?;
        file_url(value).ok_or_else(|| IomadError::invalid(FN_UPLOAD, "no file url in response"))
    }
}

/// `url` of an uploaded file record, or of the first record in a list.
fn file_url(value: Value) -> Option<String> {
    let record = match value {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };
    record
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}
