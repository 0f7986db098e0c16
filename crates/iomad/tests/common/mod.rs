//! A local stand-in for the IOMAD web service.
//!
//! Serves canned answers keyed by `wsfunction` (or `token.php` for logins)
//! and records every request so tests can assert on what was sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use serde_json::Value;

use schoolhub_iomad::{IomadClient, IomadConfig};

/// Key under which login answers are registered.
pub const LOGIN: &str = "token.php";

pub const SERVICE_TOKEN: &str = "service-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// A JSON-encoded query parameter, decoded.
    pub fn json_param(&self, key: &str) -> Value {
        serde_json::from_str(&self.query[key]).unwrap()
    }
}

#[derive(Default)]
struct Inner {
    answers: HashMap<String, (StatusCode, String)>,
    requests: Vec<Recorded>,
}

#[derive(Clone, Default)]
pub struct FakeLms {
    inner: Arc<Mutex<Inner>>,
}

impl FakeLms {
    /// Answer `key` with a JSON body and HTTP 200.
    pub fn answer(&self, key: &str, body: Value) {
        self.answer_raw(key, StatusCode::OK, &body.to_string());
    }

    pub fn answer_raw(&self, key: &str, status: StatusCode, body: &str) {
        self.inner
            .lock()
            .unwrap()
            .answers
            .insert(key.to_string(), (status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Requests that selected `wsfunction`.
    pub fn calls_to(&self, wsfunction: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.query.get("wsfunction").map(String::as_str) == Some(wsfunction))
            .collect()
    }
}

async fn handle(
    State(lms): State<FakeLms>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = if uri.path().ends_with("token.php") {
        LOGIN.to_string()
    } else {
        query.get("wsfunction").cloned().unwrap_or_default()
    };

    let mut inner = lms.inner.lock().unwrap();
    inner.requests.push(Recorded {
        method,
        path: uri.path().to_string(),
        query,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });

    let (status, body) = inner.answers.get(&key).cloned().unwrap_or((
        StatusCode::OK,
        r#"{"exception":"dml_missing_record_exception","message":"no canned answer"}"#.to_string(),
    ));
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Start the fake service on an ephemeral port and build a client for it.
pub async fn start() -> (FakeLms, IomadClient) {
    let lms = FakeLms::default();
    let app = Router::new()
        .route("/webservice/rest/server.php", any(handle))
        .route("/login/token.php", any(handle))
        .with_state(lms.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = IomadClient::new(&IomadConfig {
        base_url: format!("http://{addr}/"),
        token: SERVICE_TOKEN.to_string(),
        service: "moodle_mobile_app".to_string(),
        timeout: Some(std::time::Duration::from_secs(5)),
    })
    .unwrap();

    (lms, client)
}
