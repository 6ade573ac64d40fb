//! HTTP connector for web-service APIs.
//!
//! This crate provides a small client for request-issuing code that talks
//! to a remote server's web-service API:
//!
//! - [`GetRequest`] / [`PostRequest`]: immutable descriptions of one
//!   outbound call (query parameters, header overrides, media type,
//!   multipart body parts)
//! - [`HttpConnectorBuilder`]: fluent configuration (base URL, Basic-auth
//!   credentials or token, proxy credentials, user agent, timeouts)
//! - [`HttpConnector`]: owns the pooled transport and executes requests
//! - [`WsResponse`]: uniform buffered access to status, headers, and body
//!
//! HTTP failure statuses are plain responses, never errors; only
//! configuration problems and transport failures surface as
//! [`ConnectorError`]. Response bodies arrive gzip-compressed on the wire
//! and are inflated transparently.
//!
//! # Example
//!
//! ```ignore
//! use ws_connector::{GetRequest, HttpConnector, media};
//!
//! let connector = HttpConnector::builder()
//!     .url("https://analysis.example.com")
//!     .token("2cbf1d08ae9b")
//!     .build()?;
//!
//! let request = GetRequest::new("api/issues/search")
//!     .param("severities", "MAJOR")
//!     .media_type(media::JSON);
//!
//! let response = connector.call(&request).await?;
//! if response.code() == 200 {
//!     println!("{}", response.content()?);
//! }
//! ```

mod builder;
mod connector;
mod error;
mod multipart;
mod request;
mod response;
mod transport;

pub mod media;

pub use builder::{
    DEFAULT_CONNECT_TIMEOUT_MILLISECONDS, DEFAULT_READ_TIMEOUT_MILLISECONDS, DEFAULT_USER_AGENT,
    HttpConnectorBuilder, basic_credentials,
};
pub use connector::HttpConnector;
pub use error::ConnectorError;
pub use request::{GetRequest, Part, PostRequest, WsRequest};
pub use response::WsResponse;
pub use transport::ConnectionSpec;
