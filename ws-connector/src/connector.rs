//! Connector: executes requests against a fixed base URL.

use std::any::Any;
use std::io::Read;
use std::time::Duration;

use bytes::Bytes;
use flate2::read::GzDecoder;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, header};
use url::form_urlencoded;

use crate::builder::HttpConnectorBuilder;
use crate::error::ConnectorError;
use crate::multipart;
use crate::request::{GetRequest, PostRequest, WsRequest};
use crate::response::WsResponse;
use crate::transport::{ConnectionSpec, HttpTransport, RequestBody, connection_specs};

/// A configured client able to execute requests against a fixed base URL.
///
/// Built once via [`HttpConnector::builder`], immutable afterwards. The
/// connector owns one pooled transport client and is safe to share across
/// tasks; every call runs to completion, bounded only by the configured
/// timeouts.
///
/// Any HTTP status is a successful call: a 404 or 500 comes back as an
/// ordinary [`WsResponse`]. Only transport-level failures are errors.
///
/// # Example
///
/// ```ignore
/// use ws_connector::{GetRequest, HttpConnector, media};
///
/// let connector = HttpConnector::builder()
///     .url("https://analysis.example.com")
///     .credentials("admin", Some("admin"))
///     .build()?;
///
/// let request = GetRequest::new("api/issues/search")
///     .param("severity", "MAJOR")
///     .media_type(media::JSON);
/// let response = connector.call(&request).await?;
/// println!("{}: {}", response.code(), response.content()?);
/// ```
#[derive(Clone)]
pub struct HttpConnector {
    base_url: String,
    user_agent: HeaderValue,
    authorization: Option<HeaderValue>,
    proxy_authorization: Option<HeaderValue>,
    connect_timeout: Duration,
    read_timeout: Duration,
    connection_specs: Vec<ConnectionSpec>,
    transport: HttpTransport,
}

impl std::fmt::Debug for HttpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnector")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("authorization", &self.authorization.is_some())
            .field("proxy_authorization", &self.proxy_authorization.is_some())
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl HttpConnector {
    /// Create a new [`HttpConnectorBuilder`].
    pub fn builder() -> HttpConnectorBuilder {
        HttpConnectorBuilder::new()
    }

    /// Called by [`HttpConnectorBuilder::build`]; prefer the builder API.
    pub(crate) fn new(
        base_url: String,
        user_agent: HeaderValue,
        authorization: Option<HeaderValue>,
        proxy_authorization: Option<HeaderValue>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            user_agent,
            authorization,
            proxy_authorization,
            connect_timeout,
            read_timeout,
            connection_specs: connection_specs(),
            transport: HttpTransport::new(connect_timeout, read_timeout),
        }
    }

    /// The configured base URL, exactly as given to the builder.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// The configured read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// The ordered connection negotiation policy the transport was built
    /// with: one unrestricted TLS spec, then a cleartext fallback.
    pub fn connection_specs(&self) -> &[ConnectionSpec] {
        &self.connection_specs
    }

    /// Execute a request and wrap the result, whatever its status code.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::UnsupportedRequest`] when `request` is neither a
    /// [`GetRequest`] nor a [`PostRequest`];
    /// [`ConnectorError::Transport`] / [`ConnectorError::ReadTimeout`] on
    /// network failure. HTTP 4xx/5xx statuses are not errors.
    pub async fn call<R: WsRequest>(&self, request: &R) -> Result<WsResponse, ConnectorError> {
        let request: &dyn Any = request;
        if let Some(get) = request.downcast_ref::<GetRequest>() {
            self.execute(
                Method::GET,
                &get.path,
                &get.parameters,
                &get.headers,
                get.media_type.as_deref(),
                None,
                RequestBody::empty(),
            )
            .await
        } else if let Some(post) = request.downcast_ref::<PostRequest>() {
            let (content_type, body) = if post.parts.is_empty() {
                (None, RequestBody::empty())
            } else {
                let multipart = multipart::encode(&post.parts).await?;
                (Some(multipart.content_type), RequestBody::full(multipart.data))
            };
            self.execute(
                Method::POST,
                &post.path,
                &post.parameters,
                &post.headers,
                post.media_type.as_deref(),
                content_type,
                body,
            )
            .await
        } else {
            Err(ConnectorError::UnsupportedRequest(std::any::type_name::<R>()))
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        parameters: &[(String, String)],
        header_overrides: &[(String, String)],
        media_type: Option<&str>,
        content_type: Option<HeaderValue>,
        body: RequestBody,
    ) -> Result<WsResponse, ConnectorError> {
        // 1. Resolve the final URL
        let url = self.resolve_url(path, parameters);

        // 2. Connector-level headers, then request-level overrides
        let mut headers = HeaderMap::new();
        if let Some(media_type) = media_type {
            headers.insert(header::ACCEPT, header_value("Accept", media_type)?);
        }
        headers.insert(header::ACCEPT_CHARSET, HeaderValue::from_static("UTF-8"));
        // transport-level; the matching decompression happens in step 4
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::USER_AGENT, self.user_agent.clone());
        if let Some(authorization) = &self.authorization {
            headers.insert(header::AUTHORIZATION, authorization.clone());
        }
        if let Some(proxy_authorization) = &self.proxy_authorization {
            headers.insert(header::PROXY_AUTHORIZATION, proxy_authorization.clone());
        }
        if let Some(content_type) = content_type {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        for (name, value) in header_overrides {
            let header_name =
                HeaderName::try_from(name.as_str()).map_err(|_| ConnectorError::InvalidHeaderValue {
                    name: name.clone(),
                })?;
            headers.insert(header_name, header_value(name, value)?);
        }

        // 3. Build and send
        let mut http_request = Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .body(body)
            .map_err(|e| ConnectorError::Transport(format!("failed to build request: {e}")))?;
        *http_request.headers_mut() = headers;

        tracing::debug!(method = %method, url = %url, "sending request");
        let response = self.transport.request(http_request).await?;

        // 4. Wrap whatever came back, failure statuses included
        let status = response.status();
        let mut headers = response.headers().clone();
        let body = self.transport.collect(response.into_body()).await?;
        let body = inflate(&mut headers, body)?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received response");

        Ok(WsResponse::new(status.as_u16(), headers, body, url))
    }

    /// Join base URL and path with exactly one separating slash, then append
    /// the encoded query string in insertion order.
    fn resolve_url(&self, path: &str, parameters: &[(String, String)]) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.strip_prefix('/').unwrap_or(path);
        let mut url = format!("{base}/{path}");
        if !parameters.is_empty() {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in parameters {
                query.append_pair(key, value);
            }
            url.push('?');
            url.push_str(&query.finish());
        }
        url
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConnectorError> {
    HeaderValue::try_from(value).map_err(|_| ConnectorError::InvalidHeaderValue {
        name: name.to_string(),
    })
}

/// Transparently inflate a gzip response body, dropping the headers that
/// described the wire form.
fn inflate(headers: &mut HeaderMap, body: Bytes) -> Result<Bytes, ConnectorError> {
    let gzipped = headers
        .get(header::CONTENT_ENCODING)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"gzip"));
    if !gzipped {
        return Ok(body);
    }

    let mut decoder = GzDecoder::new(body.as_ref());
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    headers.remove(header::CONTENT_ENCODING);
    headers.remove(header::CONTENT_LENGTH);
    Ok(Bytes::from(inflated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(base_url: &str) -> HttpConnector {
        HttpConnector::builder().url(base_url).build().unwrap()
    }

    #[test]
    fn test_resolve_url_single_separating_slash() {
        // every trailing/leading slash combination resolves identically
        for base in ["http://localhost:9000", "http://localhost:9000/"] {
            for path in ["api/issues/search", "/api/issues/search"] {
                assert_eq!(
                    connector(base).resolve_url(path, &[]),
                    "http://localhost:9000/api/issues/search",
                    "base={base} path={path}"
                );
            }
        }
    }

    #[test]
    fn test_resolve_url_keeps_context_path() {
        let connector = connector("http://localhost:9000/analysis");
        assert_eq!(
            connector.resolve_url("/api/issues/search", &[]),
            "http://localhost:9000/analysis/api/issues/search"
        );
    }

    #[test]
    fn test_resolve_url_encodes_query_in_insertion_order() {
        let parameters = vec![
            ("severity".to_string(), "MAJOR".to_string()),
            ("q".to_string(), "a b&c".to_string()),
        ];
        let url = connector("http://localhost:9000").resolve_url("api/issues/search", &parameters);
        assert_eq!(
            url,
            "http://localhost:9000/api/issues/search?severity=MAJOR&q=a+b%26c"
        );
    }

    #[test]
    fn test_inflate_passes_identity_through() {
        let mut headers = HeaderMap::new();
        let body = inflate(&mut headers, Bytes::from_static(b"plain")).unwrap();
        assert_eq!(body.as_ref(), b"plain");
    }

    #[test]
    fn test_inflate_gzip_and_strip_wire_headers() {
        use flate2::{Compression, write::GzEncoder};
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello, world!").unwrap();
        let compressed = encoder.finish().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(compressed.len()));

        let body = inflate(&mut headers, Bytes::from(compressed)).unwrap();
        assert_eq!(body.as_ref(), b"hello, world!");
        assert!(!headers.contains_key(header::CONTENT_ENCODING));
        assert!(!headers.contains_key(header::CONTENT_LENGTH));
    }
}
