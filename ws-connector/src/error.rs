//! Error types for connector configuration and call execution.
//!
//! HTTP-level failure statuses (4xx, 5xx) are not errors: they are returned
//! as ordinary [`WsResponse`](crate::WsResponse) values and callers inspect
//! [`code()`](crate::WsResponse::code). Only configuration problems and
//! transport failures surface as [`ConnectorError`].

use std::time::Duration;

/// Errors raised while building an [`HttpConnector`](crate::HttpConnector)
/// or executing a request.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The configured base URL does not parse as an absolute HTTP(S) URL.
    #[error("Malformed URL: '{0}'")]
    MalformedUrl(String),

    /// The request value passed to `call()` is not one of the supported
    /// request types.
    #[error("Unsupported implementation: {0}")]
    UnsupportedRequest(&'static str),

    /// A configured or request-supplied value cannot be carried in the named
    /// HTTP header.
    #[error("invalid value for header {name}")]
    InvalidHeaderValue { name: String },

    /// Transport-level failure (connection refused, DNS, TLS negotiation).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server did not produce the response or its body within the
    /// configured read timeout.
    #[error("read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// I/O failure reading a file part or inflating a compressed body.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// `content()` was called on a body that is not valid UTF-8.
    #[error("response body is not valid UTF-8")]
    NonUtf8Body,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_message() {
        let err = ConnectorError::MalformedUrl("wrong URL".to_string());
        assert_eq!(err.to_string(), "Malformed URL: 'wrong URL'");
    }

    #[test]
    fn test_unsupported_request_message() {
        let err = ConnectorError::UnsupportedRequest("my_crate::CustomRequest");
        assert!(err.to_string().contains("Unsupported implementation: "));
        assert!(err.to_string().contains("CustomRequest"));
    }

    #[test]
    fn test_read_timeout_message() {
        let err = ConnectorError::ReadTimeout(Duration::from_millis(42));
        assert!(err.to_string().contains("42ms"));
    }
}
