//! Well-known media types for the `Accept` header.

/// JSON payloads.
pub const JSON: &str = "application/json";

/// Protobuf payloads.
pub const PROTOBUF: &str = "application/x-protobuf";

/// Plain text payloads.
pub const TXT: &str = "text/plain";
