//! Contract tests for `HttpHostFetcher` against a simulated host.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/xrpc/com.atproto.sync.getBlob` | `fetch_*` |

use std::time::Duration;

use skyblob_crypto::BlobHasher;
use skyblob_net::{build_http_client, FetchError, HostFetcher, HttpHostFetcher};
use skyblob_types::{ContentId, HashFunction, RAW_CODEC};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GET_BLOB: &str = "/xrpc/com.atproto.sync.getBlob";

fn fetcher() -> HttpHostFetcher {
    HttpHostFetcher::new(build_http_client(Duration::from_secs(5), "skyblob-test").unwrap())
}

fn hello_id() -> ContentId {
    BlobHasher::cid_v1(RAW_CODEC, HashFunction::Sha2_256, b"hello").unwrap()
}

fn host(server: &MockServer) -> Url {
    server.uri().parse().unwrap()
}

#[tokio::test]
async fn fetch_returns_bytes_and_declared_content_type() {
    let server = MockServer::start().await;
    let id = hello_id();
    Mock::given(method("GET"))
        .and(path(GET_BLOB))
        .and(query_param("did", "did:example:123"))
        .and(query_param("cid", id.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_bytes(b"hello".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetched = fetcher()
        .fetch(&host(&server), "did:example:123", &id)
        .await
        .unwrap();
    assert_eq!(fetched.data.as_ref(), b"hello");
    assert_eq!(fetched.content_type, "text/plain");
    assert_eq!(fetched.url.path(), GET_BLOB);
}

#[tokio::test]
async fn fetch_does_not_verify_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GET_BLOB))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_bytes(b"HELLO".to_vec()),
        )
        .mount(&server)
        .await;

    let fetched = fetcher()
        .fetch(&host(&server), "did:example:123", &hello_id())
        .await
        .unwrap();
    assert_eq!(fetched.data.as_ref(), b"HELLO");
}

#[tokio::test]
async fn fetch_non_200_is_not_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GET_BLOB))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "InvalidRequest",
            "message": "bad cid"
        })))
        .mount(&server)
        .await;

    match fetcher()
        .fetch(&host(&server), "did:example:123", &hello_id())
        .await
        .unwrap_err()
    {
        FetchError::NotOk { status, .. } => assert_eq!(status, 400),
        other => panic!("expected NotOk, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_json_error_body_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GET_BLOB))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "BlobNotFound",
            "message": "Blob not found"
        })))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&host(&server), "did:example:123", &hello_id())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::Remote {
            message: "BlobNotFound: Blob not found".into()
        }
    );
}

#[tokio::test]
async fn fetch_json_blob_without_error_field_is_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GET_BLOB))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"kind": "document"})),
        )
        .mount(&server)
        .await;

    let fetched = fetcher()
        .fetch(&host(&server), "did:example:123", &hello_id())
        .await
        .unwrap();
    assert!(fetched.content_type.contains("application/json"));
    assert!(!fetched.data.is_empty());
}

#[tokio::test]
async fn fetch_unreachable_host_is_transport() {
    let host: Url = "http://127.0.0.1:9".parse().unwrap();
    assert!(matches!(
        fetcher().fetch(&host, "did:example:123", &hello_id()).await,
        Err(FetchError::Transport { .. })
    ));
}
