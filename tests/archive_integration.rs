//! Integration tests for the archive client against a mock server.

use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use audiofetch_core::{ArchiveClient, ArchiveError, FileSource, TransportError};

fn metadata_body() -> serde_json::Value {
    json!({
        "server": "ia800000.us.archive.org",
        "dir": "/7/items/old-time-radio",
        "files_count": 3,
        "files": [
            {"name": "Episode_Part_1.mp3", "source": "derivative", "format": "VBR MP3", "md5": "0cc175b9c0f1b6a831c399e269772661"},
            {"name": "Episode_Part_2.mp3", "source": "derivative", "format": "VBR MP3", "md5": ""},
            {"name": "old-time-radio_meta.xml", "source": "original", "format": "Metadata"}
        ],
        "metadata": {"identifier": "old-time-radio", "title": "Old Time Radio", "creator": "Various"}
    })
}

#[tokio::test]
async fn test_search_sends_filter_and_fields() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("output", "json"))
        .and(query_param("rows", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseHeader": {"status": 0},
            "response": {"numFound": 42, "start": 0, "docs": [
                {"identifier": "jazz-1", "title": "Jazz One", "creator": ["A", "B"]},
                {"identifier": "jazz-2"}
            ]}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let results = client.search("jazz", 3).await.expect("search should succeed");

    assert_eq!(results.num_found, 42);
    assert_eq!(results.docs.len(), 2);
    assert_eq!(results.docs[0].identifier, "jazz-1");
    assert_eq!(results.docs[0].creator.as_ref().unwrap().joined(), "A; B");

    let requests = mock_server.received_requests().await.unwrap();
    let url = &requests[0].url;
    let q = url
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    assert!(q.contains("mediatype:audio"), "filter missing from: {q}");
    assert!(q.ends_with("AND jazz"), "query missing from: {q}");
    let fields: Vec<String> = url
        .query_pairs()
        .filter(|(key, _)| key == "fl[]")
        .map(|(_, value)| value.into_owned())
        .collect();
    assert!(fields.contains(&"identifier".to_string()));
}

#[tokio::test]
async fn test_metadata_returns_file_listing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/old-time-radio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body()))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let metadata = client.metadata("old-time-radio").await.unwrap();
    let files = metadata.remote_files();

    assert_eq!(files.len(), 3);
    assert_eq!(files[0].name, "Episode_Part_1.mp3");
    assert_eq!(
        files[0].content_hash.as_deref(),
        Some("0cc175b9c0f1b6a831c399e269772661")
    );
    assert_eq!(files[1].content_hash, None);
    assert_eq!(files[2].format_label, "Metadata");
}

#[tokio::test]
async fn test_metadata_unknown_item_is_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/nothing-here"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let err = client.metadata("nothing-here").await.unwrap_err();

    assert!(
        matches!(err, ArchiveError::ItemNotFound { ref identifier } if identifier == "nothing-here"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_metadata_server_error_is_http_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let err = client.metadata("flaky").await.unwrap_err();

    assert!(matches!(err, ArchiveError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_metadata_invalid_json_is_decode_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let err = client.metadata("garbled").await.unwrap_err();

    assert!(matches!(err, ArchiveError::Decode { .. }), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_fetch_bytes_streams_file_body() {
    let mock_server = MockServer::start().await;
    let body = vec![7_u8; 200_000];
    Mock::given(method("GET"))
        .and(path("/download/old-time-radio/Episode_Part_1.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let mut stream = client
        .fetch_bytes("old-time-radio", "Episode_Part_1.mp3")
        .await
        .expect("stream should open");

    let mut received = Vec::new();
    while let Some(chunk) = stream.next().await {
        received.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(received, body);
}

#[tokio::test]
async fn test_fetch_bytes_missing_file_is_status_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/old-time-radio/gone.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    let Err(err) = client.fetch_bytes("old-time-radio", "gone.mp3").await else {
        panic!("expected 404 to fail");
    };

    assert!(matches!(err, TransportError::Status { status: 404, .. }));
    assert!(err.to_string().contains("gone.mp3"));
}

#[tokio::test]
async fn test_api_key_sent_as_low_authorization() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/old-time-radio"))
        .and(header("authorization", "LOW access:secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        ArchiveClient::with_base_url(&mock_server.uri(), Some("access:secret".to_string()))
            .unwrap();
    client
        .metadata("old-time-radio")
        .await
        .expect("authorized request should match");
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata/old-time-radio"))
        .respond_with(ResponseTemplate::new(200).set_body_json(metadata_body()))
        .mount(&mock_server)
        .await;

    let client = ArchiveClient::with_base_url(&mock_server.uri(), None).unwrap();
    client.metadata("old-time-radio").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(agent.starts_with("audiofetch/"), "unexpected agent: {agent}");
    assert!(requests[0].headers.get("authorization").is_none());
}
