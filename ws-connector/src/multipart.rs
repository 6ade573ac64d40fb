//! `multipart/form-data` body encoding for POST requests with parts.

use bytes::{Bytes, BytesMut};
use http::HeaderValue;

use crate::error::ConnectorError;
use crate::request::{Part, PartSource};

/// An encoded multipart body plus the `Content-Type` header announcing its
/// boundary.
#[derive(Debug)]
pub(crate) struct MultipartBody {
    pub(crate) content_type: HeaderValue,
    pub(crate) data: Bytes,
}

/// Encode the parts of a POST request. File payloads are read here, at call
/// time.
pub(crate) async fn encode(parts: &[(String, Part)]) -> Result<MultipartBody, ConnectorError> {
    let boundary = format!("{:016x}", rand::random::<u64>());

    let mut body = BytesMut::new();
    for (name, part) in parts {
        body.extend_from_slice(b"--");
        body.extend_from_slice(boundary.as_bytes());
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", part.content_type).as_bytes());
        body.extend_from_slice(&payload(part).await?);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    let content_type = HeaderValue::try_from(format!("multipart/form-data; boundary={boundary}"))
        .map_err(|_| ConnectorError::InvalidHeaderValue {
            name: "Content-Type".to_string(),
        })?;

    Ok(MultipartBody {
        content_type,
        data: body.freeze(),
    })
}

async fn payload(part: &Part) -> Result<Bytes, ConnectorError> {
    match &part.source {
        PartSource::File(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
        PartSource::Bytes(bytes) => Ok(bytes.clone()),
    }
}
