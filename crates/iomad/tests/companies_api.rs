//! Company functions against a local fake of the web service.

mod common;

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use serde_json::json;

use schoolhub_core::assets::AssetFile;
use schoolhub_core::gateway::{CompanyGateway, GatewayError, UploadTarget};
use schoolhub_core::school::{AssetUrls, CompanyUpdate, SchoolDraft, SchoolStatus};
use schoolhub_iomad::companies::{
    FN_CREATE_COMPANIES, FN_DELETE_COMPANIES, FN_GET_COMPANIES, FN_UPDATE_COMPANIES,
};
use schoolhub_iomad::files::FN_UPLOAD;

use common::SERVICE_TOKEN;

fn lincoln_draft() -> SchoolDraft {
    SchoolDraft {
        name: "Lincoln Academy".into(),
        shortname: "lincoln".into(),
        city: "Springfield".into(),
        country: "USA".into(),
        ..SchoolDraft::default()
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_sends_service_token_and_maps_wrapped_entries() {
    let (lms, client) = common::start().await;
    lms.answer(
        FN_GET_COMPANIES,
        json!({"companies": [
            {"id": 1, "name": "Lincoln Academy", "shortname": "lincoln", "city": "Springfield", "suspended": 0},
            {"name": "", "suspended": 1}
        ]}),
    );
    let gateway: &dyn CompanyGateway = &client;

    let schools = gateway.list_companies().await.unwrap();

    assert_eq!(schools.len(), 2);
    assert_eq!(schools[0].id, "1");
    assert_eq!(schools[0].city.as_deref(), Some("Springfield"));
    assert_eq!(schools[0].status, SchoolStatus::Active);
    assert_eq!(schools[1].name, "Unnamed School");
    assert_eq!(schools[1].status, SchoolStatus::Inactive);

    let calls = lms.calls_to(FN_GET_COMPANIES);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::GET);
    assert_eq!(calls[0].path, "/webservice/rest/server.php");
    assert_eq!(calls[0].query["wstoken"], SERVICE_TOKEN);
    assert_eq!(calls[0].query["moodlewsrestformat"], "json");
}

#[tokio::test]
async fn get_company_passes_id_and_reads_array() {
    let (lms, client) = common::start().await;
    lms.answer(FN_GET_COMPANIES, json!([{"id": 4, "name": "Oak Park", "maxusers": 250}]));
    let gateway: &dyn CompanyGateway = &client;

    let record = gateway.get_company(4).await.unwrap();

    assert_eq!(record.name, "Oak Park");
    assert_eq!(record.maxusers, 250);
    assert_eq!(lms.calls_to(FN_GET_COMPANIES)[0].query["companyid"], "4");
}

#[tokio::test]
async fn get_company_empty_answer_is_not_found() {
    let (lms, client) = common::start().await;
    lms.answer(FN_GET_COMPANIES, json!([]));
    let gateway: &dyn CompanyGateway = &client;

    assert_eq!(gateway.get_company(4).await, Err(GatewayError::NotFound));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_posts_single_element_companies_array() {
    let (lms, client) = common::start().await;
    lms.answer(
        FN_CREATE_COMPANIES,
        json!([{"id": 42, "name": "Lincoln Academy", "shortname": "lincoln"}]),
    );
    let gateway: &dyn CompanyGateway = &client;
    let payload = lincoln_draft().to_payload(AssetUrls::default());

    let record = gateway.create_company(&payload).await.unwrap();

    assert_eq!(record.id, 42);
    let call = &lms.calls_to(FN_CREATE_COMPANIES)[0];
    assert_eq!(call.method, Method::POST);
    let companies = call.json_param("companies");
    assert_eq!(companies.as_array().unwrap().len(), 1);
    assert_eq!(companies[0]["code"], "lincoln");
    assert_eq!(companies[0]["theme"], "");
    assert_eq!(companies[0]["maxusers"], 1000);
    assert!(companies[0].get("customlogo").is_none());
}

#[tokio::test]
async fn create_exception_with_ok_status_is_remote_message() {
    let (lms, client) = common::start().await;
    lms.answer(
        FN_CREATE_COMPANIES,
        json!({"exception": true, "message": "permission denied"}),
    );
    let gateway: &dyn CompanyGateway = &client;
    let payload = lincoln_draft().to_payload(AssetUrls::default());

    let err = gateway.create_company(&payload).await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Remote {
            message: "permission denied".into()
        }
    );
    assert_eq!(err.user_message(), "permission denied");
}

#[tokio::test]
async fn create_exception_with_error_status_is_remote_message() {
    let (lms, client) = common::start().await;
    lms.answer_raw(
        FN_CREATE_COMPANIES,
        StatusCode::BAD_REQUEST,
        r#"{"exception":"invalid_parameter_exception","errorcode":"invalidparameter","message":"Invalid parameter value detected"}"#,
    );
    let gateway: &dyn CompanyGateway = &client;
    let payload = lincoln_draft().to_payload(AssetUrls::default());

    let err = gateway.create_company(&payload).await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid parameter value detected");
}

#[tokio::test]
async fn create_server_error_without_exception_is_transport() {
    let (lms, client) = common::start().await;
    lms.answer_raw(FN_CREATE_COMPANIES, StatusCode::INTERNAL_SERVER_ERROR, "oops");
    let gateway: &dyn CompanyGateway = &client;
    let payload = lincoln_draft().to_payload(AssetUrls::default());

    let err = gateway.create_company(&payload).await.unwrap_err();

    assert_matches!(err, GatewayError::Transport(_));
    assert_eq!(
        err.user_message(),
        "Failed to create school. Please check your permissions and try again."
    );
}

#[tokio::test]
async fn create_unrecognised_body_is_invalid_response() {
    let (lms, client) = common::start().await;
    lms.answer(FN_CREATE_COMPANIES, json!([]));
    let gateway: &dyn CompanyGateway = &client;
    let payload = lincoln_draft().to_payload(AssetUrls::default());

    assert_matches!(
        gateway.create_company(&payload).await,
        Err(GatewayError::InvalidResponse(_))
    );
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_sends_id_with_present_fields_only() {
    let (lms, client) = common::start().await;
    lms.answer(FN_UPDATE_COMPANIES, json!([{"id": 7, "name": "Renamed", "city": "Ogdenville"}]));
    let gateway: &dyn CompanyGateway = &client;
    let update = CompanyUpdate {
        name: Some("Renamed".into()),
        ..CompanyUpdate::default()
    };

    let record = gateway.update_company(7, &update).await.unwrap();

    assert_eq!(record.name, "Renamed");
    let companies = lms.calls_to(FN_UPDATE_COMPANIES)[0].json_param("companies");
    assert_eq!(companies, json!([{"id": 7, "name": "Renamed"}]));
}

#[tokio::test]
async fn update_without_body_reads_record_back() {
    let (lms, client) = common::start().await;
    lms.answer_raw(FN_UPDATE_COMPANIES, StatusCode::OK, "null");
    lms.answer(FN_GET_COMPANIES, json!([{"id": 7, "name": "Renamed"}]));
    let gateway: &dyn CompanyGateway = &client;
    let update = CompanyUpdate {
        name: Some("Renamed".into()),
        ..CompanyUpdate::default()
    };

    let record = gateway.update_company(7, &update).await.unwrap();

    assert_eq!(record.id, 7);
    assert_eq!(lms.calls_to(FN_GET_COMPANIES).len(), 1);
}

#[tokio::test]
async fn delete_confirms_on_null_or_true_only() {
    let (lms, client) = common::start().await;
    let gateway: &dyn CompanyGateway = &client;

    lms.answer_raw(FN_DELETE_COMPANIES, StatusCode::OK, "null");
    assert!(gateway.delete_company(3).await.unwrap());
    assert_eq!(lms.calls_to(FN_DELETE_COMPANIES)[0].json_param("companyids"), json!([3]));

    lms.answer(FN_DELETE_COMPANIES, json!(true));
    assert!(gateway.delete_company(3).await.unwrap());

    lms.answer(FN_DELETE_COMPANIES, json!({"warnings": []}));
    assert!(!gateway.delete_company(3).await.unwrap());
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_posts_multipart_with_draft_area_fields() {
    let (lms, client) = common::start().await;
    lms.answer(
        FN_UPLOAD,
        json!([{"filename": "logo.png", "url": "https://lms.example/draftfile.php/1/user/draft/0/logo.png"}]),
    );
    let gateway: &dyn CompanyGateway = &client;
    let file = AssetFile {
        filename: "logo.png".into(),
        content_type: "image/png".into(),
        bytes: b"PNGDATA".to_vec(),
    };

    let url = gateway
        .upload_file(&file, &UploadTarget::default())
        .await
        .unwrap();

    assert_eq!(url, "https://lms.example/draftfile.php/1/user/draft/0/logo.png");
    let call = &lms.calls_to(FN_UPLOAD)[0];
    assert_eq!(call.method, Method::POST);
    assert!(call
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("multipart/form-data"));
    let body = call.body_text();
    for part in ["file", "contextid", "component", "filearea", "itemid", "filepath", "filename"] {
        assert!(body.contains(&format!("name=\"{part}\"")), "missing part {part}");
    }
    assert!(body.contains("PNGDATA"));
    assert!(body.contains("draft"));
}

#[tokio::test]
async fn upload_without_url_is_invalid_response() {
    let (lms, client) = common::start().await;
    lms.answer(FN_UPLOAD, json!({"filename": "logo.png"}));
    let gateway: &dyn CompanyGateway = &client;
    let file = AssetFile {
        filename: "logo.png".into(),
        content_type: "image/png".into(),
        bytes: vec![1],
    };

    assert_matches!(
        gateway.upload_file(&file, &UploadTarget::default()).await,
        Err(GatewayError::InvalidResponse(_))
    );
}
