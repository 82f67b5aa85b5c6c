//! Bridging whole requests.
//!
//! The host side of the boundary runs ahead of the handler: the request body is collected,
//! classified and decoded first, so every call the [`Body`] later makes is synchronous.

use std::error::Error;

use bytes::Bytes;
use http::{HeaderMap, Request};
use http_body_util::BodyExt;
use micro_body::Body;
use tracing::error;

use crate::{BridgeConfig, BridgeError, HttpHostBody};

/// Collects the request body and replaces it with a bridged [`Body`].
///
/// The request head is kept as is, so handlers still see the method, uri and headers.
pub async fn bridge_request<B>(request: Request<B>, config: &BridgeConfig) -> Result<Request<Body<HttpHostBody>>, BridgeError>
where
    B: http_body::Body,
    B::Error: Into<Box<dyn Error + Send + Sync>>,
{
    let (parts, body) = request.into_parts();

    let bytes = body.collect().await.map_err(BridgeError::collect)?.to_bytes();
    let body = bridge_parts(&parts.headers, bytes, config)
        .inspect_err(|e| error!(path = parts.uri.path(), cause = %e, "bridge request body error"))?;

    Ok(Request::from_parts(parts, body))
}

/// Bridges an already collected request body.
pub fn bridge_parts(headers: &HeaderMap, body: Bytes, config: &BridgeConfig) -> Result<Body<HttpHostBody>, BridgeError> {
    HttpHostBody::from_parts(headers, body, config).map(Body::new)
}
