//! Video registration client tests against a mock backend.

use clipgate_core::config::StreamConfig;
use clipgate_stream::{StreamApiClient, StreamError, VideoRegistrar};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stream_config(base_url: &str) -> StreamConfig {
    StreamConfig {
        api_base_url: base_url.to_string(),
        tus_upload_url: format!("{}/tusupload", base_url),
        library_id: "42".to_string(),
        api_key: "test-api-key".to_string(),
        request_timeout_secs: 5,
    }
}

#[tokio::test]
async fn create_video_returns_backend_guid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/42/videos"))
        .and(header("AccessKey", "test-api-key"))
        .and(body_json(json!({"title": "clip.mp4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guid": "abc123",
            "title": "clip.mp4",
            "videoLibraryId": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = StreamApiClient::new(&stream_config(&server.uri())).unwrap();
    let video = client.create_video("clip.mp4").await.unwrap();
    assert_eq!(video.guid, "abc123");
}

#[tokio::test]
async fn create_video_classifies_backend_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/42/videos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = StreamApiClient::new(&stream_config(&server.uri())).unwrap();
    let err = client.create_video("clip.mp4").await.unwrap_err();
    assert!(matches!(err, StreamError::VideoCreationFailed(_)));
}

#[tokio::test]
async fn create_video_classifies_unparsable_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/42/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = StreamApiClient::new(&stream_config(&server.uri())).unwrap();
    let err = client.create_video("clip.mp4").await.unwrap_err();
    assert!(matches!(err, StreamError::VideoCreationFailed(_)));
}

#[tokio::test]
async fn create_video_rejects_empty_guid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/42/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"guid": ""})))
        .mount(&server)
        .await;

    let client = StreamApiClient::new(&stream_config(&server.uri())).unwrap();
    let err = client.create_video("clip.mp4").await.unwrap_err();
    assert!(matches!(err, StreamError::VideoCreationFailed(_)));
}

#[tokio::test]
async fn create_video_classifies_unreachable_backend() {
    // Port from a server that was shut down; connection is refused.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = StreamApiClient::new(&stream_config(&uri)).unwrap();
    let err = client.create_video("clip.mp4").await.unwrap_err();
    assert!(matches!(err, StreamError::VideoCreationFailed(_)));
}

#[tokio::test]
async fn get_video_returns_entity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/42/videos/abc123"))
        .and(header("AccessKey", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guid": "abc123",
            "title": "clip.mp4",
            "length": 12,
            "status": 4
        })))
        .mount(&server)
        .await;

    let client = StreamApiClient::new(&stream_config(&server.uri())).unwrap();
    let video = client.get_video("abc123").await.unwrap();
    assert_eq!(video.guid, "abc123");
    assert_eq!(video.length, Some(12));
}

#[tokio::test]
async fn get_video_maps_missing_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/42/videos/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = StreamApiClient::new(&stream_config(&server.uri())).unwrap();
    let err = client.get_video("missing").await.unwrap_err();
    assert!(matches!(err, StreamError::VideoNotFound(_)));
}
