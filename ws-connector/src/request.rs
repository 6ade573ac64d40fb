//! Request model: immutable descriptions of one outbound call.
//!
//! [`GetRequest`] and [`PostRequest`] are plain value types built with
//! fluent setters, then handed to
//! [`HttpConnector::call`](crate::HttpConnector::call). A POST request
//! switches to a `multipart/form-data` body as soon as a [`Part`] is added;
//! query parameters stay on the URL for both methods.

use std::any::Any;
use std::path::PathBuf;

use bytes::Bytes;
use http::Method;

/// Capability set shared by all request variants.
///
/// The connector dispatches on the concrete type behind this trait; only
/// [`GetRequest`] and [`PostRequest`] are supported, and any other
/// implementation is rejected at call time.
pub trait WsRequest: Any {
    /// HTTP method of the call.
    fn method(&self) -> Method;

    /// Path relative to the connector's base URL. A leading slash is
    /// accepted and ignored when the final URL is resolved.
    fn path(&self) -> &str;

    /// Query parameters, in insertion order.
    fn parameters(&self) -> &[(String, String)];

    /// Request-level header overrides, in insertion order.
    fn headers(&self) -> &[(String, String)];
}

/// Insert or replace in an insertion-ordered key/value list.
fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

/// A GET request.
///
/// # Example
///
/// ```ignore
/// use ws_connector::{GetRequest, media};
///
/// let request = GetRequest::new("api/issues/search")
///     .param("severity", "MAJOR")
///     .media_type(media::PROTOBUF);
/// let response = connector.call(&request).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct GetRequest {
    pub(crate) path: String,
    pub(crate) parameters: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) media_type: Option<String>,
}

impl GetRequest {
    /// Create a GET request for the given path, relative to the connector's
    /// base URL.
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a query parameter. Setting the same key again replaces the value
    /// in place, keeping the original position.
    pub fn param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        upsert(&mut self.parameters, key.into(), value.into());
        self
    }

    /// Override or add a request header.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        upsert(&mut self.headers, name.into(), value.into());
        self
    }

    /// Set the media type sent as the `Accept` header. Absent by default.
    pub fn media_type<S: Into<String>>(mut self, media_type: S) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

impl WsRequest for GetRequest {
    fn method(&self) -> Method {
        Method::GET
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// A POST request.
///
/// Without parts the body is empty and query parameters are appended to the
/// URL, exactly as for GET. Adding a part switches the body encoding to
/// `multipart/form-data`.
///
/// # Example
///
/// ```ignore
/// use ws_connector::{Part, PostRequest, media};
///
/// let request = PostRequest::new("api/report/upload")
///     .param("project", "theKey")
///     .part("report", Part::file(media::TXT, report_path));
/// let response = connector.call(&request).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostRequest {
    pub(crate) path: String,
    pub(crate) parameters: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) media_type: Option<String>,
    pub(crate) parts: Vec<(String, Part)>,
}

impl PostRequest {
    /// Create a POST request for the given path, relative to the connector's
    /// base URL.
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a query parameter. Parameters go on the URL, never into the body.
    pub fn param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        upsert(&mut self.parameters, key.into(), value.into());
        self
    }

    /// Override or add a request header.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        upsert(&mut self.headers, name.into(), value.into());
        self
    }

    /// Set the media type sent as the `Accept` header. Absent by default.
    pub fn media_type<S: Into<String>>(mut self, media_type: S) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Add a named body part, switching the body to `multipart/form-data`.
    pub fn part<S: Into<String>>(mut self, name: S, part: Part) -> Self {
        self.parts.push((name.into(), part));
        self
    }

    /// Body parts, in insertion order. Empty for a simple POST.
    pub fn parts(&self) -> &[(String, Part)] {
        &self.parts
    }
}

impl WsRequest for PostRequest {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

/// One named segment of a `multipart/form-data` body.
///
/// Carries a declared content type and a payload source; file payloads are
/// read when the request is executed, not when the part is created.
#[derive(Debug, Clone)]
pub struct Part {
    pub(crate) content_type: String,
    pub(crate) source: PartSource,
}

#[derive(Debug, Clone)]
pub(crate) enum PartSource {
    File(PathBuf),
    Bytes(Bytes),
}

impl Part {
    /// A part whose payload is read from a file at call time.
    pub fn file<S: Into<String>, P: Into<PathBuf>>(content_type: S, path: P) -> Self {
        Self {
            content_type: content_type.into(),
            source: PartSource::File(path.into()),
        }
    }

    /// A part with an in-memory binary payload.
    pub fn bytes<S: Into<String>, B: Into<Bytes>>(content_type: S, payload: B) -> Self {
        Self {
            content_type: content_type.into(),
            source: PartSource::Bytes(payload.into()),
        }
    }

    /// A part with an in-memory text payload.
    pub fn text<S: Into<String>, T: Into<String>>(content_type: S, payload: T) -> Self {
        Self {
            content_type: content_type.into(),
            source: PartSource::Bytes(Bytes::from(payload.into())),
        }
    }

    /// Declared content type of this part.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_request_defaults() {
        let request = GetRequest::new("api/issues/search");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "api/issues/search");
        assert!(request.parameters().is_empty());
        assert!(request.headers().is_empty());
        assert!(request.media_type.is_none());
    }

    #[test]
    fn test_params_keep_insertion_order() {
        let request = GetRequest::new("api/issues/search")
            .param("severities", "BLOCKER")
            .param("resolved", "false")
            .param("ps", "100");
        let keys: Vec<&str> = request.parameters().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["severities", "resolved", "ps"]);
    }

    #[test]
    fn test_param_same_key_replaces_in_place() {
        let request = GetRequest::new("api/issues/search")
            .param("severities", "BLOCKER")
            .param("resolved", "false")
            .param("severities", "MAJOR");
        assert_eq!(
            request.parameters(),
            [
                ("severities".to_string(), "MAJOR".to_string()),
                ("resolved".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_post_request_with_parts() {
        let request = PostRequest::new("api/report/upload")
            .part("report", Part::text("text/plain", "the report content"));
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.parts().len(), 1);
        assert_eq!(request.parts()[0].0, "report");
        assert_eq!(request.parts()[0].1.content_type(), "text/plain");
    }

    #[test]
    fn test_media_type_override() {
        let request = PostRequest::new("api/issues/search").media_type("application/x-protobuf");
        assert_eq!(request.media_type.as_deref(), Some("application/x-protobuf"));
    }
}
