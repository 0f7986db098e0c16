//! IOMAD company ("school") administration functions.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use schoolhub_core::assets::AssetFile;
use schoolhub_core::gateway::{CompanyGateway, GatewayError, UploadTarget};
use schoolhub_core::school::{CompanyPayload, CompanyRecord, CompanyUpdate, School};
use schoolhub_core::types::DbId;

use crate::error::IomadError;
use crate::rpc::{json_param, IomadClient};

pub const FN_GET_COMPANIES: &str = "block_iomad_company_admin_get_companies";
pub const FN_CREATE_COMPANIES: &str = "block_iomad_company_admin_create_companies";
pub const FN_UPDATE_COMPANIES: &str = "block_iomad_company_admin_update_companies";
pub const FN_DELETE_COMPANIES: &str = "block_iomad_company_admin_delete_companies";

impl IomadClient {
    /// Every company visible to the service account, as raw JSON entries.
    pub async fn get_companies(&self) -> Result<Vec<Value>, IomadError> {
        let value = self.call_raw(Method::GET, FN_GET_COMPANIES, &[]).await?;
        Ok(company_entries(value))
    }

    /// A single company by id.
    pub async fn get_company_details(&self, id: DbId) -> Result<CompanyRecord, IomadError> {
        let params = [("companyid".to_string(), id.to_string())];
        let value = self.call_raw(Method::GET, FN_GET_COMPANIES, &params).await?;

        let entry = pick_company(value, id).ok_or(IomadError::NotFound {
            entity: "Company",
            id,
        })?;
        Ok(serde_json::from_value(entry)?)
    }

    /// Create one company and return the server's record of it.
    pub async fn create_company(&self, payload: &CompanyPayload) -> Result<CompanyRecord, IomadError> {
        let params = [("companies".to_string(), json_param(&[payload])?)];
        let value = self.call_raw(Method::POST, FN_CREATE_COMPANIES, &params).await?;

        let record = first_record(FN_CREATE_COMPANIES, value)?;
        tracing::info!(company_id = record.id, shortname = %record.shortname, "IOMAD company created");
        Ok(record)
    }

    /// Apply a partial update. Some IOMAD versions answer with nothing, in
    /// which case the record is read back.
    pub async fn update_company(
        &self,
        id: DbId,
        update: &CompanyUpdate,
    ) -> Result<CompanyRecord, IomadError> {
        let mut entry = serde_json::to_value(update)?;
        if let Value::Object(map) = &mut entry {
            map.insert("id".to_string(), Value::from(id));
        }
        let params = [("companies".to_string(), json_param(&[entry])?)];
        let value = self.call_raw(Method::POST, FN_UPDATE_COMPANIES, &params).await?;

        if value.is_null() {
            return self.get_company_details(id).await;
        }
        first_record(FN_UPDATE_COMPANIES, value)
    }

    /// Delete a company. Returns whether the service confirmed it.
    pub async fn delete_company(&self, id: DbId) -> Result<bool, IomadError> {
        let params = [("companyids".to_string(), json_param(&[id])?)];
        let value = self.call_raw(Method::POST, FN_DELETE_COMPANIES, &params).await?;

        let confirmed = matches!(value, Value::Null | Value::Bool(true));
        tracing::info!(company_id = id, confirmed, "IOMAD company delete requested");
        Ok(confirmed)
    }
}

/// Normalise the list shapes seen in the wild: a bare array, an object
/// wrapping `companies`, or a single company object.
fn company_entries(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("companies") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("companies".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        _ => Vec::new(),
    }
}

/// The entry for `id` from a details response. Falls back to the first
/// entry when none carries a matching id; a lone object must have an id.
fn pick_company(value: Value, id: DbId) -> Option<Value> {
    let single = matches!(&value, Value::Object(map) if !map.contains_key("companies"));
    if single {
        return value.get("id").is_some().then_some(value);
    }
    let mut entries = company_entries(value);
    let position = entries
        .iter()
        .position(|e| e.get("id").and_then(Value::as_i64) == Some(id))
        .unwrap_or(0);
    (position < entries.len()).then(|| entries.swap_remove(position))
}

/// The first record of a non-empty array response.
fn first_record(wsfunction: &str, value: Value) -> Result<CompanyRecord, IomadError> {
    match value {
        Value::Array(mut items) if !items.is_empty() => Ok(serde_json::from_value(items.swap_remove(0))?),
        other => Err(IomadError::invalid(
            wsfunction,
            format!("expected a non-empty array, got {other}"),
        )),
    }
}

#[async_trait]
impl CompanyGateway for IomadClient {
    async fn list_companies(&self) -> Result<Vec<School>, GatewayError> {
        let entries = self.get_companies().await?;
        Ok(entries.iter().map(School::from_remote).collect())
    }

    async fn get_company(&self, id: DbId) -> Result<CompanyRecord, GatewayError> {
        Ok(self.get_company_details(id).await?)
    }

    async fn create_company(&self, payload: &CompanyPayload) -> Result<CompanyRecord, GatewayError> {
        Ok(IomadClient::create_company(self, payload).await?)
    }

    async fn update_company(
        &self,
        id: DbId,
        update: &CompanyUpdate,
    ) -> Result<CompanyRecord, GatewayError> {
        Ok(IomadClient::update_company(self, id, update).await?)
    }

    async fn delete_company(&self, id: DbId) -> Result<bool, GatewayError> {
        Ok(IomadClient::delete_company(self, id).await?)
    }

    async fn upload_file(
        &self,
        file: &AssetFile,
        target: &UploadTarget,
    ) -> Result<String, GatewayError> {
        Ok(self.upload_draft_file(file, target).await?)
    }
}
