//! TLS configuration and connector setup for the hyper client.
//!
//! The negotiation policy is fixed: attempt TLS first, accepting every
//! protocol version the runtime rustls build supports and validating
//! against the platform's default trust store, and fall back to cleartext
//! HTTP when the base URL scheme is not TLS.

use std::sync::Arc;
use std::time::Duration;

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::ClientConfig;

/// One entry of the transport's ordered connection negotiation policy.
///
/// Mirrors what the transport was built with; exposed through
/// [`HttpConnector::connection_specs`](crate::HttpConnector::connection_specs)
/// for introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    tls: bool,
    tls_versions: Option<Vec<String>>,
}

impl ConnectionSpec {
    /// TLS with no version restriction (`tls_versions()` is `None`).
    pub(crate) fn modern_tls() -> Self {
        Self {
            tls: true,
            tls_versions: None,
        }
    }

    /// Cleartext HTTP fallback.
    pub(crate) fn cleartext() -> Self {
        Self {
            tls: false,
            tls_versions: None,
        }
    }

    /// Whether this spec negotiates TLS.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Accepted TLS versions; `None` means every version the runtime
    /// supports.
    pub fn tls_versions(&self) -> Option<&[String]> {
        self.tls_versions.as_deref()
    }
}

/// The ordered policy every connector is built with: TLS first, cleartext
/// fallback second.
pub(crate) fn connection_specs() -> Vec<ConnectionSpec> {
    vec![ConnectionSpec::modern_tls(), ConnectionSpec::cleartext()]
}

/// Build the TLS configuration: ring provider, all supported protocol
/// versions, platform root certificates, no client auth.
fn default_tls_config() -> ClientConfig {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("safe default protocol versions should be valid");

    builder
        .with_root_certificates(build_root_store())
        .with_no_client_auth()
}

/// Load the platform's default trust store.
fn build_root_store() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();
    let native_certs = rustls_native_certs::load_native_certs();
    if !native_certs.errors.is_empty() {
        // Some certs may still have loaded; keep going with those.
        tracing::debug!("errors loading native certs: {:?}", native_certs.errors);
    }
    roots.add_parsable_certificates(native_certs.certs);
    roots
}

/// Build the HTTPS-or-HTTP connector with the given connect timeout.
pub(crate) fn build_https_connector(
    connect_timeout: Duration,
) -> HttpsConnector<HttpConnector> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(connect_timeout));

    HttpsConnectorBuilder::new()
        .with_tls_config(default_tls_config())
        .https_or_http()
        .enable_all_versions()
        .wrap_connector(http)
}
