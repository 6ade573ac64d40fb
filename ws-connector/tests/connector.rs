//! Connector behavior tests against a live in-process mock server.

use std::io::Write;
use std::time::Duration;

use http::Method;
use mock_ws_server::{MockResponse, MockWebServer};
use ws_connector::{
    ConnectorError, DEFAULT_CONNECT_TIMEOUT_MILLISECONDS, DEFAULT_READ_TIMEOUT_MILLISECONDS,
    GetRequest, HttpConnector, Part, PostRequest, WsRequest, basic_credentials, media,
};

async fn server_with_hello_world() -> MockWebServer {
    let server = MockWebServer::start().await;
    server
        .enqueue(MockResponse::new().body("hello, world!"))
        .await;
    server
}

fn connector(url: &str) -> HttpConnector {
    HttpConnector::builder().url(url).build().unwrap()
}

#[tokio::test]
async fn test_default_settings() {
    let server = server_with_hello_world().await;
    let under_test = connector(&server.url());
    assert_eq!(under_test.base_url(), server.url());

    let request = GetRequest::new("api/issues/search").media_type(media::PROTOBUF);
    let response = under_test.call(&request).await.unwrap();

    // default timeouts on the connector
    assert_eq!(
        under_test.connect_timeout(),
        Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MILLISECONDS)
    );
    assert_eq!(
        under_test.read_timeout(),
        Duration::from_millis(DEFAULT_READ_TIMEOUT_MILLISECONDS)
    );

    // response
    assert!(response.has_content());
    assert_eq!(response.content().unwrap(), "hello, world!");

    // the request as received by the server
    let recorded = server.take_request().await.unwrap();
    assert_eq!(recorded.method, "GET");
    assert_eq!(recorded.path, "/api/issues/search");
    assert_eq!(recorded.header("Accept"), Some(media::PROTOBUF));
    assert_eq!(recorded.header("Accept-Charset"), Some("UTF-8"));
    assert_eq!(recorded.header("Accept-Encoding"), Some("gzip"));
    assert!(
        recorded
            .header("User-Agent")
            .unwrap()
            .starts_with("ws-connector/")
    );
}

#[tokio::test]
async fn test_use_basic_authentication() {
    let server = server_with_hello_world().await;
    let under_test = HttpConnector::builder()
        .url(server.url())
        .credentials("theLogin", Some("thePassword"))
        .build()
        .unwrap();

    under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    let recorded = server.take_request().await.unwrap();
    assert_eq!(
        recorded.header("Authorization"),
        Some(basic_credentials("theLogin", "thePassword").as_str())
    );
}

#[tokio::test]
async fn test_basic_authentication_with_absent_password() {
    let server = server_with_hello_world().await;
    let under_test = HttpConnector::builder()
        .url(server.url())
        .credentials("theLogin", None)
        .build()
        .unwrap();

    under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    let recorded = server.take_request().await.unwrap();
    assert_eq!(
        recorded.header("Authorization"),
        Some(basic_credentials("theLogin", "").as_str())
    );
}

/// An access token replaces the login/password pair and travels in the
/// login slot.
#[tokio::test]
async fn test_use_access_token() {
    let server = server_with_hello_world().await;
    let under_test = HttpConnector::builder()
        .url(server.url())
        .token("theToken")
        .build()
        .unwrap();

    under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    let recorded = server.take_request().await.unwrap();
    assert_eq!(
        recorded.header("Authorization"),
        Some(basic_credentials("theToken", "").as_str())
    );
}

#[tokio::test]
async fn test_use_proxy_authentication() {
    let server = server_with_hello_world().await;
    let under_test = HttpConnector::builder()
        .url(server.url())
        .proxy_credentials("theProxyLogin", Some("theProxyPassword"))
        .build()
        .unwrap();

    under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    let recorded = server.take_request().await.unwrap();
    assert_eq!(
        recorded.header("Proxy-Authorization"),
        Some(basic_credentials("theProxyLogin", "theProxyPassword").as_str())
    );
}

#[tokio::test]
async fn test_override_timeouts() {
    let server = MockWebServer::start().await;
    let under_test = HttpConnector::builder()
        .url(server.url())
        .read_timeout_milliseconds(42)
        .connect_timeout_milliseconds(74)
        .build()
        .unwrap();

    assert_eq!(under_test.read_timeout(), Duration::from_millis(42));
    assert_eq!(under_test.connect_timeout(), Duration::from_millis(74));
}

#[tokio::test]
async fn test_send_user_agent() {
    let server = server_with_hello_world().await;
    let under_test = HttpConnector::builder()
        .url(server.url())
        .user_agent("Scanner/2.3")
        .build()
        .unwrap();

    under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    let recorded = server.take_request().await.unwrap();
    assert_eq!(recorded.header("User-Agent"), Some("Scanner/2.3"));
}

struct FakeRequest;

impl WsRequest for FakeRequest {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> &str {
        "api/issues/search"
    }

    fn parameters(&self) -> &[(String, String)] {
        &[]
    }

    fn headers(&self) -> &[(String, String)] {
        &[]
    }
}

#[tokio::test]
async fn test_fail_if_unknown_implementation_of_request() {
    let server = MockWebServer::start().await;
    let under_test = connector(&server.url());

    let err = under_test.call(&FakeRequest).await.unwrap_err();
    assert!(matches!(err, ConnectorError::UnsupportedRequest(_)));
    assert!(err.to_string().contains("Unsupported implementation: "));
    assert!(err.to_string().contains("FakeRequest"));
}

#[test]
fn test_fail_if_malformed_url() {
    let err = HttpConnector::builder()
        .url("wrong URL")
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("Malformed URL: 'wrong URL'"));
}

#[tokio::test]
async fn test_send_post_request() {
    let server = server_with_hello_world().await;
    let request = PostRequest::new("api/issues/search")
        .param("severity", "MAJOR")
        .media_type(media::PROTOBUF);

    let response = connector(&server.url()).call(&request).await.unwrap();

    assert!(response.has_content());
    assert_eq!(response.content().unwrap(), "hello, world!");

    let recorded = server.take_request().await.unwrap();
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.path, "/api/issues/search?severity=MAJOR");
    // query parameters stay on the URL; the body stays empty
    assert!(recorded.body.is_empty());
}

#[tokio::test]
async fn test_upload_file() {
    let server = server_with_hello_world().await;
    let mut report_file = tempfile::NamedTempFile::new().unwrap();
    report_file.write_all(b"the report content").unwrap();

    let request = PostRequest::new("api/report/upload")
        .param("project", "theKey")
        .part("report", Part::file(media::TXT, report_file.path()))
        .media_type(media::PROTOBUF);

    let response = connector(&server.url()).call(&request).await.unwrap();
    assert!(response.has_content());

    let recorded = server.take_request().await.unwrap();
    assert_eq!(recorded.method, "POST");
    assert_eq!(recorded.path, "/api/report/upload?project=theKey");
    assert!(
        recorded
            .header("Content-Type")
            .unwrap()
            .starts_with("multipart/form-data; boundary=")
    );
    let body = recorded.body_text();
    assert!(body.contains("Content-Disposition: form-data; name=\"report\""));
    assert!(body.contains("Content-Type: text/plain"));
    assert!(body.contains("the report content"));
}

#[tokio::test]
async fn test_http_error() {
    let server = MockWebServer::start().await;
    server.enqueue(MockResponse::new().status(404)).await;

    let response = connector(&server.url())
        .call(&PostRequest::new("api/issues/search"))
        .await
        .unwrap();

    assert_eq!(response.code(), 404);
    assert!(!response.has_content());
}

#[tokio::test]
async fn test_support_base_url_ending_with_slash() {
    let server = server_with_hello_world().await;
    assert!(server.url().ends_with('/'));
    let under_test = connector(server.url().trim_end_matches('/'));

    let response = under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    assert!(response.has_content());
    let recorded = server.take_request().await.unwrap();
    assert_eq!(recorded.path, "/api/issues/search");
}

#[tokio::test]
async fn test_support_base_url_with_context() {
    let server = MockWebServer::start().await;
    let under_test = connector(&format!("{}analysis", server.url()));

    server.enqueue(MockResponse::new().body("hello, world!")).await;
    let response = under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();
    assert_eq!(
        response.request_url(),
        format!("{}analysis/api/issues/search", server.url())
    );

    // a leading slash on the path must not duplicate the context path
    server.enqueue(MockResponse::new().body("hello, world!")).await;
    let response = under_test
        .call(&GetRequest::new("/api/issues/search"))
        .await
        .unwrap();
    assert_eq!(
        response.request_url(),
        format!("{}analysis/api/issues/search", server.url())
    );
}

#[tokio::test]
async fn test_tls_and_cleartext_connection_specs() {
    let server = MockWebServer::start().await;
    let under_test = connector(&server.url());

    let specs = under_test.connection_specs();
    assert_eq!(specs.len(), 2);

    // TLS first; tls_versions() == None means all supported versions
    assert!(specs[0].is_tls());
    assert!(specs[0].tls_versions().is_none());

    // cleartext fallback second
    assert!(!specs[1].is_tls());
}

#[tokio::test]
async fn test_gzip_response_transparently_inflated() {
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(b"hello, world!").unwrap();
    let compressed = encoder.finish().unwrap();

    let server = MockWebServer::start().await;
    server
        .enqueue(
            MockResponse::new()
                .header("Content-Encoding", "gzip")
                .body(compressed),
        )
        .await;

    let response = connector(&server.url())
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap();

    assert_eq!(response.content().unwrap(), "hello, world!");
    // decompression is transparent; the wire encoding is not observable
    assert!(response.header("Content-Encoding").is_none());
}

#[tokio::test]
async fn test_request_level_header_override() {
    let server = server_with_hello_world().await;
    let request = GetRequest::new("api/system/status").header("X-Correlation-Id", "abc-123");

    connector(&server.url()).call(&request).await.unwrap();

    let recorded = server.take_request().await.unwrap();
    assert_eq!(recorded.header("X-Correlation-Id"), Some("abc-123"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let under_test = connector(&format!("http://{addr}"));
    let err = under_test
        .call(&GetRequest::new("api/issues/search"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectorError::Transport(_)));
}
