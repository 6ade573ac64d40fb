//! Fluent configuration for [`HttpConnector`].
//!
//! Setters accumulate; nothing is validated before [`build()`]. The built
//! connector is immutable; reconfiguring means building a new one.
//!
//! [`build()`]: HttpConnectorBuilder::build

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;
use url::Url;

use crate::connector::HttpConnector;
use crate::error::ConnectorError;

/// Default connect timeout, in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MILLISECONDS: u64 = 5_000;

/// Default read timeout, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MILLISECONDS: u64 = 10_000;

/// Default `User-Agent`, identifying this library.
pub const DEFAULT_USER_AGENT: &str = concat!("ws-connector/", env!("CARGO_PKG_VERSION"));

/// The `Basic` authorization header value for a login/password pair
/// (RFC 7617).
pub fn basic_credentials(login: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{login}:{password}")))
}

/// Builder for [`HttpConnector`].
///
/// # Example
///
/// ```ignore
/// use ws_connector::HttpConnector;
///
/// let connector = HttpConnector::builder()
///     .url("https://ci.example.com/analysis")
///     .token("2cbf1d08ae9b")
///     .build()?;
/// ```
#[derive(Clone, Default)]
pub struct HttpConnectorBuilder {
    url: Option<String>,
    credentials: Option<(String, String)>,
    proxy_credentials: Option<(String, String)>,
    user_agent: Option<String>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpConnectorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnectorBuilder")
            .field("url", &self.url)
            .field("credentials", &self.credentials.is_some())
            .field("proxy_credentials", &self.proxy_credentials.is_some())
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl HttpConnectorBuilder {
    /// Create a builder with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of the server, e.g. `https://ci.example.com/analysis`.
    /// Required; must parse as an absolute HTTP(S) URL.
    pub fn url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Authenticate with HTTP Basic credentials. An absent password is
    /// encoded as the empty string, never omitted.
    ///
    /// Shares a slot with [`token()`](Self::token); the last call wins.
    pub fn credentials<S: Into<String>>(mut self, login: S, password: Option<&str>) -> Self {
        self.credentials = Some((login.into(), password.unwrap_or_default().to_string()));
        self
    }

    /// Authenticate with an access token. Equivalent to
    /// `credentials(token, Some(""))`: the token travels in the login slot
    /// of the Basic scheme.
    ///
    /// Shares a slot with [`credentials()`](Self::credentials); the last
    /// call wins.
    pub fn token<S: Into<String>>(self, token: S) -> Self {
        self.credentials(token, Some(""))
    }

    /// Authenticate against an HTTP proxy, sent as `Proxy-Authorization`
    /// with the same Basic scheme.
    pub fn proxy_credentials<S: Into<String>>(mut self, login: S, password: Option<&str>) -> Self {
        self.proxy_credentials = Some((login.into(), password.unwrap_or_default().to_string()));
        self
    }

    /// Override the default `User-Agent` ([`DEFAULT_USER_AGENT`]).
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Time allowed to establish the TCP connection. Default
    /// [`DEFAULT_CONNECT_TIMEOUT_MILLISECONDS`].
    pub fn connect_timeout_milliseconds(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    /// Time allowed to receive the response head and body. Default
    /// [`DEFAULT_READ_TIMEOUT_MILLISECONDS`].
    pub fn read_timeout_milliseconds(mut self, timeout_ms: u64) -> Self {
        self.read_timeout = Some(Duration::from_millis(timeout_ms));
        self
    }

    /// Validate the configuration and build the connector, including its
    /// long-lived transport client.
    ///
    /// # Errors
    ///
    /// [`ConnectorError::MalformedUrl`] when the base URL is missing or not
    /// an absolute HTTP(S) URL; [`ConnectorError::InvalidHeaderValue`] when
    /// a configured value cannot be carried in its header.
    pub fn build(self) -> Result<HttpConnector, ConnectorError> {
        let base_url = self.url.unwrap_or_default();
        let parsed =
            Url::parse(&base_url).map_err(|_| ConnectorError::MalformedUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConnectorError::MalformedUrl(base_url));
        }

        let user_agent = header_value(
            "User-Agent",
            self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
        )?;
        let authorization = self
            .credentials
            .map(|(login, password)| {
                header_value("Authorization", &basic_credentials(&login, &password))
            })
            .transpose()?;
        let proxy_authorization = self
            .proxy_credentials
            .map(|(login, password)| {
                header_value("Proxy-Authorization", &basic_credentials(&login, &password))
            })
            .transpose()?;

        Ok(HttpConnector::new(
            base_url,
            user_agent,
            authorization,
            proxy_authorization,
            self.connect_timeout
                .unwrap_or(Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MILLISECONDS)),
            self.read_timeout
                .unwrap_or(Duration::from_millis(DEFAULT_READ_TIMEOUT_MILLISECONDS)),
        ))
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConnectorError> {
    HeaderValue::try_from(value).map_err(|_| ConnectorError::InvalidHeaderValue {
        name: name.to_string(),
    })
}
