//! Response wrapper: uniform access to status, headers, and body.

use bytes::Bytes;
use http::HeaderMap;

use crate::error::ConnectorError;

/// The result of executing a request, whatever its HTTP status.
///
/// The body is fully buffered, so every accessor can be called any number
/// of times. A 404 or 500 answer is a normal `WsResponse`; inspect
/// [`code()`](Self::code) to detect HTTP-level failure.
#[derive(Debug, Clone)]
pub struct WsResponse {
    code: u16,
    headers: HeaderMap,
    body: Bytes,
    request_url: String,
}

impl WsResponse {
    pub(crate) fn new(code: u16, headers: HeaderMap, body: Bytes, request_url: String) -> Self {
        Self {
            code,
            headers,
            body,
            request_url,
        }
    }

    /// HTTP status code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// True iff the body is non-empty.
    pub fn has_content(&self) -> bool {
        !self.body.is_empty()
    }

    /// The body decoded as UTF-8 text.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::NonUtf8Body`] when the body is binary; use
    /// [`bytes()`](Self::bytes) for such payloads.
    pub fn content(&self) -> Result<&str, ConnectorError> {
        std::str::from_utf8(&self.body).map_err(|_| ConnectorError::NonUtf8Body)
    }

    /// The raw body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the raw body.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// All response headers. Headers may be multi-valued.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a header, for headers that appear multiple times.
    pub fn header_all(&self, name: &str) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// The final resolved URL this response was obtained from, exactly as
    /// sent on the wire.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }
}
