//! School ("company") records: the client-side draft, the creation and
//! update payloads sent to IOMAD, the server-issued record, and the `School`
//! view model shown in lists.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, UnixTime};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default user cap for a new school.
pub const DEFAULT_MAX_USERS: i64 = 1000;

/// Fallback display name for list entries that carry no name.
pub const UNNAMED_SCHOOL: &str = "Unnamed School";

/// Fallback short name when neither `shortname` nor `name` is present.
pub const MISSING_SHORTNAME: &str = "N/A";

// ---------------------------------------------------------------------------
// Draft record
// ---------------------------------------------------------------------------

/// A school that has not been persisted yet.
///
/// Field names follow the IOMAD `companies` parameter so the payload can be
/// assembled without renaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolDraft {
    pub name: String,
    pub shortname: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub code: String,
    pub theme: String,
    pub parentid: DbId,
    pub ecommerce: bool,
    pub maxusers: i64,
    pub expiry: UnixTime,
    pub suspended: bool,
    pub validto: UnixTime,
    pub companydomains: Vec<String>,
    pub companycourses: Vec<DbId>,
    pub companymanagers: Vec<DbId>,
}

impl Default for SchoolDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            shortname: String::new(),
            city: String::new(),
            country: String::new(),
            region: String::new(),
            code: String::new(),
            theme: String::new(),
            parentid: 0,
            ecommerce: false,
            maxusers: DEFAULT_MAX_USERS,
            expiry: 0,
            suspended: false,
            validto: 0,
            companydomains: Vec::new(),
            companycourses: Vec::new(),
            companymanagers: Vec::new(),
        }
    }
}

impl SchoolDraft {
    /// Check the four required identity/location fields.
    ///
    /// Fields are checked in display order and the first empty one (after
    /// trimming) is reported.
    pub fn validate_identity(&self) -> Result<(), CoreError> {
        let required = [
            (&self.name, "School name is required"),
            (&self.shortname, "Short name is required"),
            (&self.city, "City is required"),
            (&self.country, "Country is required"),
        ];

        for (value, message) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Validation(message.to_string()));
            }
        }
        Ok(())
    }

    /// The code that will be submitted: the explicit code, or one derived
    /// from the short name when left blank.
    pub fn effective_code(&self) -> String {
        if self.code.is_empty() {
            derive_code(&self.shortname)
        } else {
            self.code.clone()
        }
    }

    /// Set the user cap. Zero or negative input falls back to the default.
    pub fn set_max_users(&mut self, maxusers: i64) {
        self.maxusers = if maxusers > 0 {
            maxusers
        } else {
            DEFAULT_MAX_USERS
        };
    }

    /// Set `validto` from a calendar date (UTC midnight). `None` clears it.
    pub fn set_valid_until(&mut self, date: Option<NaiveDate>) {
        self.validto = date.map_or(0, date_to_unix);
    }

    /// The `validto` timestamp as a calendar date, if set.
    pub fn valid_until(&self) -> Option<NaiveDate> {
        unix_to_date(self.validto)
    }

    /// Build the creation payload with the given remote asset URLs.
    pub fn to_payload(&self, assets: AssetUrls) -> CompanyPayload {
        CompanyPayload {
            name: self.name.clone(),
            shortname: self.shortname.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            region: self.region.clone(),
            code: self.effective_code(),
            theme: self.theme.clone(),
            parentid: self.parentid,
            ecommerce: self.ecommerce,
            maxusers: self.maxusers,
            expiry: self.expiry,
            suspended: self.suspended,
            validto: self.validto,
            companydomains: self.companydomains.clone(),
            companycourses: self.companycourses.clone(),
            companymanagers: self.companymanagers.clone(),
            customlogo: assets.logo,
            customheaderlogo: assets.header_logo,
            customfavicon: assets.favicon,
        }
    }
}

/// Derive a school code from its short name: lowercase, whitespace removed.
pub fn derive_code(shortname: &str) -> String {
    shortname
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Convert a calendar date to the unix timestamp of its UTC midnight.
pub fn date_to_unix(date: NaiveDate) -> UnixTime {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
        .timestamp()
}

/// Convert a unix timestamp to its UTC calendar date. Zero means "unset".
pub fn unix_to_date(ts: UnixTime) -> Option<NaiveDate> {
    if ts == 0 {
        return None;
    }
    chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Remote URLs of uploaded branding assets. Absent entries are omitted from
/// the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetUrls {
    pub logo: Option<String>,
    pub header_logo: Option<String>,
    pub favicon: Option<String>,
}

/// One element of the `companies` array sent to
/// `block_iomad_company_admin_create_companies`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPayload {
    pub name: String,
    pub shortname: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub code: String,
    pub theme: String,
    pub parentid: DbId,
    pub ecommerce: bool,
    pub maxusers: i64,
    pub expiry: UnixTime,
    pub suspended: bool,
    pub validto: UnixTime,
    pub companydomains: Vec<String>,
    pub companycourses: Vec<DbId>,
    pub companymanagers: Vec<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customlogo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customheaderlogo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customfavicon: Option<String>,
}

/// Partial update for an existing company. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CompanyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "School name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Short name must not be empty"))]
    pub shortname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "City must not be empty"))]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Country must not be empty"))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecommerce: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Maximum users must be at least 1"))]
    pub maxusers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validto: Option<UnixTime>,
}

impl CompanyUpdate {
    /// Whether the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Remote record
// ---------------------------------------------------------------------------

/// A company as returned by IOMAD after create/update/get.
///
/// Only `id` is mandatory; every other field defaults when the server omits
/// it. Moodle encodes booleans as `0`/`1` in many functions, so boolean
/// fields accept either form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: DbId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shortname: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub parentid: DbId,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub ecommerce: bool,
    #[serde(default)]
    pub maxusers: i64,
    #[serde(default)]
    pub expiry: UnixTime,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub suspended: bool,
    #[serde(default)]
    pub validto: UnixTime,
    #[serde(default)]
    pub timecreated: UnixTime,
    #[serde(default)]
    pub timemodified: UnixTime,
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

/// Loose truthiness for values coming from the web service.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0" && s != "false",
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// Display status of a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolStatus {
    Active,
    Inactive,
}

impl SchoolStatus {
    pub fn from_suspended(suspended: bool) -> Self {
        if suspended {
            Self::Inactive
        } else {
            Self::Active
        }
    }
}

/// School card shown in lists and handed back after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: String,
    pub name: String,
    pub shortname: String,
    pub description: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub logo: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub user_count: i64,
    pub course_count: i64,
    pub status: SchoolStatus,
}

impl School {
    /// Map a freshly created company into its card.
    pub fn from_record(record: &CompanyRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            shortname: record.shortname.clone(),
            description: String::new(),
            city: Some(record.city.clone()),
            country: Some(record.country.clone()),
            logo: None,
            address: None,
            phone: None,
            email: None,
            website: None,
            user_count: 0,
            course_count: 0,
            status: SchoolStatus::from_suspended(record.suspended),
        }
    }

    /// Map one entry of a company list response.
    ///
    /// List responses vary between IOMAD versions, so each display field
    /// is looked up under every key the service has been seen to use.
    pub fn from_remote(company: &Value) -> Self {
        let id = match company.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let name = text(company, &["name"]).unwrap_or_else(|| UNNAMED_SCHOOL.to_string());
        let shortname = text(company, &["shortname", "name"])
            .unwrap_or_else(|| MISSING_SHORTNAME.to_string());

        Self {
            id,
            name,
            shortname,
            description: text(company, &["summary", "description"]).unwrap_or_default(),
            city: text(company, &["city"]),
            country: text(company, &["country"]),
            logo: text(company, &["companylogo", "logo_url", "logourl"]),
            address: text(company, &["address"]),
            phone: text(company, &["phone1"]),
            email: text(company, &["email"]),
            website: text(company, &["url"]),
            user_count: count(company, "usercount"),
            course_count: count(company, "coursecount"),
            status: SchoolStatus::from_suspended(
                company.get("suspended").is_some_and(is_truthy),
            ),
        }
    }
}

/// First non-empty string among `keys`.
fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

fn count(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
