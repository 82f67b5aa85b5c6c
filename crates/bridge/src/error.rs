use std::error::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("unsupported content type {content_type}")]
    UnsupportedContentType { content_type: String },

    #[error("unparseable {content_type} body: {reason}")]
    Unparseable { content_type: String, reason: String },

    #[error("invalid multipart body: {reason}")]
    InvalidMultipart { reason: String },

    #[error("collect body error: {source}")]
    Collect {
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl BridgeError {
    pub fn unsupported_content_type<S: ToString>(content_type: S) -> Self {
        Self::UnsupportedContentType { content_type: content_type.to_string() }
    }

    pub fn unparseable<C: ToString, S: ToString>(content_type: C, reason: S) -> Self {
        Self::Unparseable { content_type: content_type.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_multipart<S: ToString>(reason: S) -> Self {
        Self::InvalidMultipart { reason: reason.to_string() }
    }

    pub fn collect<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::Collect { source: e.into() }
    }
}
