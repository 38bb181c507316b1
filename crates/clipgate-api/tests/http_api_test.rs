//! HTTP API integration tests over the full router with mock backend clients.
//!
//! Run with: `cargo test -p clipgate-api --test http_api_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use clipgate_core::UrlSigner;
use helpers::{test_server, MockRegistrar, MockUploader, TEST_CDN_HOSTNAME, TEST_SECURITY_KEY};
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn health_endpoint_responds() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn link_endpoint_returns_verifiable_signed_url() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let response = server.get("/api/videos/abc123/link").await;
    assert_eq!(response.status_code(), 200);

    let url = response.text();
    assert!(url.starts_with(&format!(
        "https://{}/abc123/playlist.m3u8?token=",
        TEST_CDN_HOSTNAME
    )));
    assert!(url.contains("&token_path=%2Fabc123%2F"));
    assert!(url.contains("&expires="));

    // The reference verification re-derives the token from the URL's own
    // parameters; it must accept what the endpoint issued.
    let signer = UrlSigner::new(TEST_SECURITY_KEY, 3600);
    signer.verify(&url).expect("issued link must verify");

    // A signer with a different key must reject it.
    let wrong = UrlSigner::new("other-key", 3600);
    assert!(wrong.verify(&url).is_err());
}

#[tokio::test]
async fn thumbnail_link_shares_the_video_path_scope() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let response = server.get("/api/videos/abc123/thumbnails/thumb_1.jpg/link").await;
    assert_eq!(response.status_code(), 200);

    let url = response.text();
    assert!(url.starts_with(&format!(
        "https://{}/abc123/thumb_1.jpg?token=",
        TEST_CDN_HOSTNAME
    )));
    assert!(url.contains("&token_path=%2Fabc123%2F"));

    let signer = UrlSigner::new(TEST_SECURITY_KEY, 3600);
    signer.verify(&url).expect("issued link must verify");
}

#[tokio::test]
async fn link_endpoint_rejects_malformed_ids() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let response = server.get("/api/videos/..%2Fsecret/link").await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn get_video_passes_backend_metadata_through() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let response = server.get("/api/videos/abc123").await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["guid"], "abc123");
    assert_eq!(body["length"], 12);

    let response = server.get("/api/videos/missing").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn upload_acknowledges_then_reports_completion_via_status() {
    let registrar = MockRegistrar::with_fixed_guid("abc123");
    let uploader = MockUploader::succeeding();
    let server = test_server(registrar, uploader.clone());

    let form = MultipartForm::new().add_part(
        "video",
        Part::bytes(b"fake video bytes".to_vec())
            .file_name("clip.mp4")
            .mime_type("video/mp4"),
    );
    let response = server.post("/api/videos/upload").multipart(form).await;
    assert_eq!(response.status_code(), 202);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["message"], "Video upload is in progress");
    let job_id = body["job_id"].as_str().expect("job id in response").to_string();

    // The acknowledgment races the background job; poll the status endpoint.
    let mut last = Value::Null;
    for _ in 0..200 {
        let status = server.get(&format!("/api/videos/uploads/{}", job_id)).await;
        assert_eq!(status.status_code(), 200);
        last = status.json::<Value>();
        if last["status"] == "completed" || last["status"] == "failed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(last["status"], "completed");
    assert_eq!(last["video_id"], "abc123");
    assert_eq!(last["file_name"], "clip.mp4");
    assert_eq!(uploader.call_count(), 1);
}

#[tokio::test]
async fn upload_without_video_field_is_rejected() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let form = MultipartForm::new().add_part(
        "attachment",
        Part::bytes(b"bytes".to_vec()).file_name("clip.mp4"),
    );
    let response = server.post("/api/videos/upload").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let form = MultipartForm::new().add_part(
        "video",
        Part::bytes(Vec::new()).file_name("clip.mp4"),
    );
    let response = server.post("/api/videos/upload").multipart(form).await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn unknown_job_id_is_not_found() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let response = server
        .get(&format!("/api/videos/uploads/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let server = test_server(MockRegistrar::succeeding(), MockUploader::succeeding());

    let response = server.get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let spec = response.json::<Value>();
    assert!(spec["paths"]["/api/videos/{id}/link"].is_object());
    assert!(spec["paths"]["/api/videos/upload"].is_object());
}
