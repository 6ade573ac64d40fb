//! Pooled hyper client with connect and read timeouts.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tokio::time::timeout;

use super::RequestBody;
use super::connector::build_https_connector;
use crate::error::ConnectorError;

/// Type alias for the hyper client with HTTPS connector.
type HyperClient = Client<HttpsConnector<HttpConnector>, RequestBody>;

/// HTTP transport over hyper_util's legacy pooled client.
///
/// The connect timeout lives on the TCP connector; the read timeout bounds
/// waiting for the response head and for the body, independently. One
/// transport is built per connector and shared by every call.
#[derive(Clone)]
pub(crate) struct HttpTransport {
    client: HyperClient,
    read_timeout: Duration,
}

impl HttpTransport {
    pub(crate) fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        let mut builder = Client::builder(TokioExecutor::new());
        builder.pool_timer(TokioTimer::new());
        let client = builder.build(build_https_connector(connect_timeout));

        Self {
            client,
            read_timeout,
        }
    }

    /// Send a request and wait for the response head.
    pub(crate) async fn request(
        &self,
        request: http::Request<RequestBody>,
    ) -> Result<http::Response<Incoming>, ConnectorError> {
        match timeout(self.read_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ConnectorError::Transport(format!("request failed: {e}"))),
            Err(_) => Err(ConnectorError::ReadTimeout(self.read_timeout)),
        }
    }

    /// Buffer the whole response body.
    pub(crate) async fn collect(&self, body: Incoming) -> Result<Bytes, ConnectorError> {
        match timeout(self.read_timeout, body.collect()).await {
            Ok(Ok(collected)) => Ok(collected.to_bytes()),
            Ok(Err(e)) => Err(ConnectorError::Transport(format!(
                "failed to read response body: {e}"
            ))),
            Err(_) => Err(ConnectorError::ReadTimeout(self.read_timeout)),
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}
