use crate::Kind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("expected {expected} body, got {actual}")]
    KindMismatch { expected: Kind, actual: Kind },

    #[error("decode {kind} body error: {source}")]
    Decode {
        kind: Kind,
        #[source]
        source: serde_json::Error,
    },

    #[error("host call error: {source}")]
    HostCall {
        #[from]
        source: HostCallError,
    },
}

impl BodyError {
    pub fn kind_mismatch(expected: Kind, actual: Kind) -> Self {
        Self::KindMismatch { expected, actual }
    }

    pub fn decode(kind: Kind, source: serde_json::Error) -> Self {
        Self::Decode { kind, source }
    }

    pub fn is_kind_mismatch(&self) -> bool {
        matches!(self, Self::KindMismatch { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Returns the cached host failure, if this error came from the boundary.
    pub fn host_call_error(&self) -> Option<&HostCallError> {
        match self {
            Self::HostCall { source } => Some(source),
            _ => None,
        }
    }
}

/// A failure reported by the host while serving a retrieval.
///
/// The error is cached in the memo slot and cloned out to every caller, so it has to be
/// [`Clone`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostCallError {
    #[error("host object does not provide `{call}`")]
    Unsupported { call: &'static str },

    #[error("host call `{call}` failed: {reason}")]
    Failed { call: &'static str, reason: String },

    #[error("upload `{field}` declares {declared} bytes but host holds {available}")]
    SizeMismatch { field: String, declared: u64, available: usize },
}

impl HostCallError {
    pub fn unsupported(call: &'static str) -> Self {
        Self::Unsupported { call }
    }

    pub fn failed<S: ToString>(call: &'static str, reason: S) -> Self {
        Self::Failed { call, reason: reason.to_string() }
    }

    pub fn size_mismatch<S: ToString>(field: S, declared: u64, available: usize) -> Self {
        Self::SizeMismatch { field: field.to_string(), declared, available }
    }
}
