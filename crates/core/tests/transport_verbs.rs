//! Generic GET/POST/PUT verbs of the shared transport.

mod common;

use serde_json::json;

use common::{CannedResponse, MockServer};
use topomatch_core::testing::fixtures;
use topomatch_core::{progress_channel, RequestBody, ResponseKind};

#[tokio::test]
async fn test_get_binary_and_json() {
    let server = MockServer::start().await;
    server.respond(
        "/images/jura/a.jpg",
        CannedResponse::bytes("image/jpeg", vec![1, 2, 3]),
    );
    let client = server.client();
    let transport = client.transport();

    let image = transport
        .get("/images/jura/a.jpg", ResponseKind::Binary)
        .await
        .unwrap()
        .into_binary()
        .unwrap();
    assert_eq!(image.body, vec![1, 2, 3]);

    let status = transport
        .get("/health", ResponseKind::Json)
        .await
        .unwrap()
        .into_structured()
        .unwrap();
    assert_eq!(status, json!({"status": "ok"}));

    let methods: Vec<String> = server.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["GET", "GET"]);
}

#[tokio::test]
async fn test_post_json_with_progress() {
    let server = MockServer::start().await;
    let client = server.client();
    let (reporter, mut rx) = progress_channel();

    let body = json!({"region_name": "jura", "crags": []});
    client
        .transport()
        .post(
            "/region",
            RequestBody::Json(body.clone()),
            ResponseKind::Json,
            Some(&reporter),
        )
        .await
        .unwrap();

    let request = server.only_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.json, Some(body));

    let last = std::iter::from_fn(|| rx.try_recv().ok()).last().unwrap();
    assert!(last.is_complete());
}

#[tokio::test]
async fn test_put_multipart() {
    let server = MockServer::start().await;
    let client = server.client();

    let upload = fixtures::image("topo.png", 512);
    client
        .transport()
        .put(
            "/crag/jura/zborow",
            RequestBody::Multipart(vec![("image1", upload)]),
            ResponseKind::Json,
            None,
        )
        .await
        .unwrap();

    let request = server.only_request();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/crag/jura/zborow");
    assert_eq!(request.fields.len(), 1);
    assert_eq!(request.fields[0].file_name.as_deref(), Some("topo.png"));
    assert_eq!(request.fields[0].content_type.as_deref(), Some("image/png"));
    assert_eq!(request.fields[0].len, 512);
}

#[tokio::test]
async fn test_multipart_progress_counts_file_bytes() {
    let server = MockServer::start().await;
    let client = server.client_with(topomatch_core::Config {
        upload_chunk_size: 100,
        ..Default::default()
    });
    let (reporter, mut rx) = progress_channel();

    let files = vec![
        ("image1", fixtures::image("a.jpg", 250)),
        ("image2", fixtures::image("b.jpg", 150)),
    ];
    client
        .transport()
        .post(
            "/get_matching_matrix",
            RequestBody::Multipart(files),
            ResponseKind::Json,
            Some(&reporter),
        )
        .await
        .unwrap();

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    let loaded: Vec<u64> = events.iter().map(|e| e.loaded).collect();
    assert_eq!(loaded, vec![100, 200, 250, 350, 400]);
    assert!(events.iter().all(|e| e.total == Some(400)));
    assert!(events.last().unwrap().is_complete());
}
