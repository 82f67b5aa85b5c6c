//! The http host body object.
//!
//! [`HttpHostBody`] is what the request side of the boundary hands to a [`micro_body::Body`]:
//! the collected request body, already classified and decoded into the representation its
//! discriminator tag promises.

use std::str;

use bytes::Bytes;
use http::HeaderMap;
use micro_body::{HostBody, HostCallError, HostUpload};
use serde::de::IgnoredAny;
use serde_json::{Map, Value};
use tracing::debug;

use crate::classify::{classify, BodyType};
use crate::multipart::MultipartDecoder;
use crate::{BridgeConfig, BridgeError};

#[derive(Debug)]
pub struct HttpHostBody {
    tag: &'static str,
    payload: Payload,
}

#[derive(Debug)]
enum Payload {
    None,
    Text(String),
    Json(String),
    Fields { fields: String, files: Vec<StoredUpload> },
    Binary { bytes: Bytes, mime: String },
}

#[derive(Debug)]
struct StoredUpload {
    field: String,
    name: String,
    content_type: String,
    bytes: Bytes,
}

impl HttpHostBody {
    /// A host body for a request without content.
    pub fn none() -> Self {
        Self { tag: BodyType::None.tag(), payload: Payload::None }
    }

    /// Classifies and decodes a collected request body.
    ///
    /// Text is decoded lossily, invalid utf-8 becomes U+FFFD. Json is validated and kept as
    /// sent, minus surrounding whitespace. Url encoded forms and multipart forms both become a
    /// json field map; multipart file parts additionally become uploads.
    pub fn from_parts(headers: &HeaderMap, body: Bytes, config: &BridgeConfig) -> Result<Self, BridgeError> {
        let body_type = classify(headers, config)?;
        let tag = body_type.tag();
        let len = body.len();

        let payload = match body_type {
            BodyType::None => Payload::None,
            BodyType::Text => Payload::Text(lossy(&body)),
            BodyType::Json => {
                serde_json::from_slice::<IgnoredAny>(&body)
                    .map_err(|e| BridgeError::unparseable(mime::APPLICATION_JSON, e))?;
                let json = str::from_utf8(&body).map_err(|e| BridgeError::unparseable(mime::APPLICATION_JSON, e))?;
                Payload::Json(json.trim().to_owned())
            }
            BodyType::Form => {
                let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)
                    .map_err(|e| BridgeError::unparseable(mime::APPLICATION_WWW_FORM_URLENCODED, e))?;
                let fields = pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect::<Map<_, _>>();
                Payload::Fields { fields: Value::Object(fields).to_string(), files: Vec::new() }
            }
            BodyType::Multipart { boundary } => multipart(&boundary, &body)?,
            BodyType::Binary { mime } => Payload::Binary { bytes: body, mime },
        };

        debug!(tag, len, "bridged request body");
        Ok(Self { tag, payload })
    }
}

fn multipart(boundary: &str, body: &Bytes) -> Result<Payload, BridgeError> {
    let parts = MultipartDecoder::new(boundary).decode(body)?;

    let mut fields = Map::new();
    let mut files = Vec::new();
    for part in parts {
        match part.filename() {
            Some(filename) => {
                let content_type = part.content_type().unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref()).to_owned();
                let meta = serde_json::json!({
                    "name": filename,
                    "size": part.data().len(),
                    "type": content_type,
                });
                fields.insert(part.name().to_owned(), meta);
                files.push(StoredUpload {
                    field: part.name().to_owned(),
                    name: filename.to_owned(),
                    content_type,
                    bytes: part.data().clone(),
                });
            }
            None => {
                fields.insert(part.name().to_owned(), Value::String(lossy(part.data())));
            }
        }
    }

    Ok(Payload::Fields { fields: Value::Object(fields).to_string(), files })
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl HostBody for HttpHostBody {
    fn body_type(&self) -> Option<&str> {
        Some(self.tag)
    }

    fn text(&self) -> Result<String, HostCallError> {
        match &self.payload {
            Payload::Text(text) => Ok(text.clone()),
            _ => Err(HostCallError::unsupported("text")),
        }
    }

    fn json(&self) -> Result<String, HostCallError> {
        match &self.payload {
            Payload::Json(json) => Ok(json.clone()),
            _ => Err(HostCallError::unsupported("json")),
        }
    }

    fn fields(&self) -> Result<String, HostCallError> {
        match &self.payload {
            Payload::Fields { fields, .. } => Ok(fields.clone()),
            _ => Err(HostCallError::unsupported("fields")),
        }
    }

    fn files(&self) -> Result<Option<Vec<HostUpload<'_>>>, HostCallError> {
        match &self.payload {
            Payload::Fields { files, .. } => Ok(Some(
                files
                    .iter()
                    .map(|f| HostUpload {
                        field: &f.field,
                        name: &f.name,
                        content_type: &f.content_type,
                        size: f.bytes.len() as u64,
                        bytes: &f.bytes,
                    })
                    .collect(),
            )),
            _ => Err(HostCallError::unsupported("files")),
        }
    }

    fn binary(&self) -> Result<&[u8], HostCallError> {
        match &self.payload {
            Payload::Binary { bytes, .. } => Ok(bytes.as_ref()),
            _ => Err(HostCallError::unsupported("binary")),
        }
    }

    fn binary_type(&self) -> Result<String, HostCallError> {
        match &self.payload {
            Payload::Binary { mime, .. } => Ok(mime.clone()),
            _ => Err(HostCallError::unsupported("binary_type")),
        }
    }
}
