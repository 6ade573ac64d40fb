//! HTTP transport: connection policy and the pooled hyper client.
//!
//! The transport is built once per connector, from two connection specs in
//! strict order: TLS with every protocol version the runtime rustls build
//! supports, validated against the platform trust store, then a cleartext
//! fallback for `http://` base URLs. Connect and read timeouts are enforced
//! here, independently of each other.

mod body;
mod connector;
mod hyper;

pub use connector::ConnectionSpec;
pub(crate) use body::RequestBody;
pub(crate) use connector::connection_specs;
pub(crate) use hyper::HttpTransport;
