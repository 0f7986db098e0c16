#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use schoolhub_api::auth::jwt::{generate_access_token, JwtConfig};
use schoolhub_api::config::ServerConfig;
use schoolhub_api::router::build_app_router;
use schoolhub_api::state::AppState;
use schoolhub_core::assets::AssetFile;
use schoolhub_core::course::Course;
use schoolhub_core::gateway::{
    AuthGateway, CompanyGateway, CourseGateway, GatewayError, LmsUser, UploadTarget,
};
use schoolhub_core::school::{CompanyPayload, CompanyRecord, CompanyUpdate, School};
use schoolhub_core::types::DbId;
use schoolhub_iomad::IomadConfig;

pub const USERNAME: &str = "jdoe";
pub const PASSWORD: &str = "secret";
pub const BAD_LOGIN: &str = "Invalid login, please try again";

/// Build a test `ServerConfig` with safe defaults.
///
/// The IOMAD settings point nowhere; every LMS call goes to [`FakeLms`].
/// The success pause is zero so submissions return immediately.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
        },
        iomad: IomadConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            token: "unused".to_string(),
            service: "moodle_mobile_app".to_string(),
            timeout: None,
        },
        asset_max_size_mb: 1,
        submit_success_delay_ms: 0,
        draft_idle_timeout_secs: 3600,
        max_drafts_per_user: 3,
    }
}

// ---------------------------------------------------------------------------
// In-memory LMS
// ---------------------------------------------------------------------------

/// Stands in for every gateway. Fields are public so tests can seed data and
/// inspect what was sent.
#[derive(Default)]
pub struct FakeLms {
    pub schools: Mutex<Vec<School>>,
    pub records: Mutex<BTreeMap<DbId, CompanyRecord>>,
    pub courses: Mutex<Vec<Course>>,
    pub created: Mutex<Vec<CompanyPayload>>,
    pub updates: Mutex<Vec<(DbId, CompanyUpdate)>>,
    pub uploads: Mutex<Vec<String>>,
    /// Filenames whose upload fails.
    pub failing_uploads: Mutex<Vec<String>>,
    /// Returned by the next create instead of a record.
    pub create_error: Mutex<Option<GatewayError>>,
    /// Returned by every list call instead of data.
    pub list_error: Mutex<Option<GatewayError>>,
}

impl FakeLms {
    pub fn with_record(self, record: CompanyRecord) -> Self {
        self.schools.lock().unwrap().push(School::from_record(&record));
        self.records.lock().unwrap().insert(record.id, record);
        self
    }

    pub fn with_course(self, course: Course) -> Self {
        self.courses.lock().unwrap().push(course);
        self
    }

    pub fn fail_create(&self, err: GatewayError) {
        *self.create_error.lock().unwrap() = Some(err);
    }

    pub fn fail_upload(&self, filename: &str) {
        self.failing_uploads.lock().unwrap().push(filename.to_string());
    }

    pub fn fail_lists(&self, err: GatewayError) {
        *self.list_error.lock().unwrap() = Some(err);
    }

    fn list_failure(&self) -> Result<(), GatewayError> {
        match self.list_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn record(id: DbId, name: &str, shortname: &str, city: &str) -> CompanyRecord {
    CompanyRecord {
        id,
        name: name.to_string(),
        shortname: shortname.to_string(),
        city: city.to_string(),
        country: "US".to_string(),
        theme: String::new(),
        parentid: 0,
        ecommerce: false,
        maxusers: 1000,
        expiry: 0,
        code: shortname.to_uppercase(),
        region: String::new(),
        suspended: false,
        validto: 0,
        timecreated: 1_700_000_000,
        timemodified: 1_700_000_000,
    }
}

pub fn course(id: DbId, fullname: &str, category: &str, summary: &str) -> Course {
    Course {
        id,
        fullname: fullname.to_string(),
        shortname: format!("C{id}"),
        summary: Some(summary.to_string()),
        category_name: Some(category.to_string()),
        format: Some("topics".to_string()),
        startdate: None,
        enddate: None,
        visible: true,
    }
}

#[async_trait]
impl CompanyGateway for FakeLms {
    async fn list_companies(&self) -> Result<Vec<School>, GatewayError> {
        self.list_failure()?;
        Ok(self.schools.lock().unwrap().clone())
    }

    async fn get_company(&self, id: DbId) -> Result<CompanyRecord, GatewayError> {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn create_company(&self, payload: &CompanyPayload) -> Result<CompanyRecord, GatewayError> {
        self.created.lock().unwrap().push(payload.clone());
        if let Some(err) = self.create_error.lock().unwrap().take() {
            return Err(err);
        }
        let mut records = self.records.lock().unwrap();
        let id = records.keys().next_back().copied().unwrap_or(0) + 1;
        let mut created = record(id, &payload.name, &payload.shortname, &payload.city);
        created.country = payload.country.clone();
        created.code = payload.code.clone();
        created.theme = payload.theme.clone();
        created.maxusers = payload.maxusers;
        created.validto = payload.validto;
        records.insert(id, created.clone());
        Ok(created)
    }

    async fn update_company(
        &self,
        id: DbId,
        update: &CompanyUpdate,
    ) -> Result<CompanyRecord, GatewayError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(GatewayError::NotFound)?;
        if let Some(name) = &update.name {
            record.name = name.clone();
        }
        if let Some(city) = &update.city {
            record.city = city.clone();
        }
        if let Some(theme) = &update.theme {
            record.theme = theme.clone();
        }
        if let Some(suspended) = update.suspended {
            record.suspended = suspended;
        }
        Ok(record.clone())
    }

    async fn delete_company(&self, id: DbId) -> Result<bool, GatewayError> {
        match self.records.lock().unwrap().remove(&id) {
            Some(_) => Ok(true),
            None => Err(GatewayError::NotFound),
        }
    }

    async fn upload_file(
        &self,
        file: &AssetFile,
        _target: &UploadTarget,
    ) -> Result<String, GatewayError> {
        self.uploads.lock().unwrap().push(file.filename.clone());
        if self.failing_uploads.lock().unwrap().contains(&file.filename) {
            return Err(GatewayError::Transport("connection reset".into()));
        }
        Ok(format!("https://lms.test/draftfile.php/{}", file.filename))
    }
}

#[async_trait]
impl CourseGateway for FakeLms {
    async fn list_courses(&self) -> Result<Vec<Course>, GatewayError> {
        self.list_failure()?;
        Ok(self.courses.lock().unwrap().clone())
    }

    async fn get_course(&self, id: DbId) -> Result<Course, GatewayError> {
        self.courses
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }
}

#[async_trait]
impl AuthGateway for FakeLms {
    async fn authenticate(&self, username: &str, password: &str) -> Result<LmsUser, GatewayError> {
        if username != USERNAME || password != PASSWORD {
            return Err(GatewayError::Remote {
                message: BAD_LOGIN.to_string(),
            });
        }
        Ok(LmsUser {
            id: 12,
            username: USERNAME.to_string(),
            fullname: "Jo Doe".to_string(),
            firstname: "Jo".to_string(),
            lastname: "Doe".to_string(),
            picture_url: None,
        })
    }
}

// ---------------------------------------------------------------------------
// App and tokens
// ---------------------------------------------------------------------------

/// The full application router, with `lms` behind every gateway.
pub fn build_test_app(lms: Arc<FakeLms>) -> Router {
    build_test_app_with(lms, test_config())
}

/// Like [`build_test_app`] with a caller-supplied configuration.
pub fn build_test_app_with(lms: Arc<FakeLms>, config: ServerConfig) -> Router {
    let state = AppState::new(config.clone(), lms.clone(), lms.clone(), lms);
    build_app_router(state, &config)
}

/// A valid access token for `user_id` signed in as `role`.
pub fn token(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, "Test User", &test_config().jwt)
        .expect("token generation should succeed")
}

pub fn admin_token() -> String {
    token(1, "admin")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// A request with no body.
pub async fn call_auth(app: &Router, method: Method, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_auth(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

const BOUNDARY: &str = "schoolhub-test-boundary";

/// PUT a single multipart field named `field`.
pub async fn put_file(
    app: &Router,
    uri: &str,
    token: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::put(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
