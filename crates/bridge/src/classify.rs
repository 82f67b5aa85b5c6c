//! Content type classification.
//!
//! Maps the `Content-Type` of a request onto the representation its host body object will
//! serve. A request without a content type has no body; everything else is matched on the
//! essence of the mime type, parameters ignored except for the multipart boundary.

use http::header::CONTENT_TYPE;
use http::HeaderMap;
use mime::Mime;

use crate::{BridgeConfig, BridgeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyType {
    None,
    Text,
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `multipart/form-data`
    Multipart { boundary: String },
    /// raw bytes, tagged with the mime reported to the body
    Binary { mime: String },
}

impl BodyType {
    /// The discriminator tag of the host body object.
    pub fn tag(&self) -> &'static str {
        match self {
            BodyType::None => "none",
            BodyType::Text => "text",
            BodyType::Json => "json",
            BodyType::Form | BodyType::Multipart { .. } => "fields",
            BodyType::Binary { .. } => "bin",
        }
    }
}

pub fn classify(headers: &HeaderMap, config: &BridgeConfig) -> Result<BodyType, BridgeError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(BodyType::None);
    };

    let raw = String::from_utf8_lossy(value.as_bytes());
    let Ok(content_type) = raw.parse::<Mime>() else {
        return fallback(&raw, None, config);
    };

    let essence = content_type.essence_str().to_ascii_lowercase();
    let body_type = match essence.as_str() {
        "application/octet-stream" => BodyType::Binary { mime: mime::APPLICATION_OCTET_STREAM.to_string() },
        "application/x-www-form-urlencoded" => BodyType::Form,
        "multipart/form-data" => match content_type.get_param(mime::BOUNDARY) {
            Some(boundary) if !boundary.as_str().is_empty() => BodyType::Multipart { boundary: boundary.as_str().to_owned() },
            _ => return Err(BridgeError::invalid_multipart("missing boundary")),
        },
        "application/json" => BodyType::Json,
        "text/plain" => BodyType::Text,
        _ if config.lenient_text() && content_type.type_() == mime::TEXT => BodyType::Text,
        _ => return fallback(&raw, Some(&content_type), config),
    };

    Ok(body_type)
}

fn fallback(raw: &str, content_type: Option<&Mime>, config: &BridgeConfig) -> Result<BodyType, BridgeError> {
    if !config.unknown_as_binary() {
        return Err(BridgeError::unsupported_content_type(raw.trim()));
    }

    let content_type = content_type.unwrap_or(config.default_binary_type());
    Ok(BodyType::Binary { mime: content_type.essence_str().to_ascii_lowercase() })
}
