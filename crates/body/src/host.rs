//! The host capability surface.
//!
//! A host body object lives on the other side of a runtime boundary. [`HostBody`] exposes one
//! synchronous call per retrieval; an adapter only needs to implement the calls its kind serves,
//! the rest answer [`HostCallError::Unsupported`].
//!
//! Byte-carrying calls hand out borrowed slices. The borrow is tied to `&self`, so host memory
//! can never outlive the call that produced it; [`Body`](crate::Body) copies those bytes into
//! locally owned buffers before returning.
//!
//! [`MemoryHost`] is an in-memory host with per-call counters and failure injection.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::HostCallError;

pub trait HostBody: Send + Sync {
    /// The discriminator tag, read once when a body is constructed.
    fn body_type(&self) -> Option<&str>;

    fn text(&self) -> Result<String, HostCallError> {
        Err(HostCallError::unsupported("text"))
    }

    /// The encoded structured payload.
    fn json(&self) -> Result<String, HostCallError> {
        Err(HostCallError::unsupported("json"))
    }

    /// The encoded field map, a json object.
    fn fields(&self) -> Result<String, HostCallError> {
        Err(HostCallError::unsupported("fields"))
    }

    /// The upload descriptors, `None` when the host holds no upload list at all.
    fn files(&self) -> Result<Option<Vec<HostUpload<'_>>>, HostCallError> {
        Err(HostCallError::unsupported("files"))
    }

    fn binary(&self) -> Result<&[u8], HostCallError> {
        Err(HostCallError::unsupported("binary"))
    }

    fn binary_type(&self) -> Result<String, HostCallError> {
        Err(HostCallError::unsupported("binary_type"))
    }
}

/// One upload descriptor, borrowed from the host for the duration of a single call.
#[derive(Debug, Clone, Copy)]
pub struct HostUpload<'a> {
    pub field: &'a str,
    pub name: &'a str,
    pub content_type: &'a str,
    pub size: u64,
    pub bytes: &'a [u8],
}

macro_rules! forward_host_body {
    ($($ty:ty),*) => {
        $(
            impl<T: HostBody + ?Sized> HostBody for $ty {
                #[inline]
                fn body_type(&self) -> Option<&str> {
                    (**self).body_type()
                }

                #[inline]
                fn text(&self) -> Result<String, HostCallError> {
                    (**self).text()
                }

                #[inline]
                fn json(&self) -> Result<String, HostCallError> {
                    (**self).json()
                }

                #[inline]
                fn fields(&self) -> Result<String, HostCallError> {
                    (**self).fields()
                }

                #[inline]
                fn files(&self) -> Result<Option<Vec<HostUpload<'_>>>, HostCallError> {
                    (**self).files()
                }

                #[inline]
                fn binary(&self) -> Result<&[u8], HostCallError> {
                    (**self).binary()
                }

                #[inline]
                fn binary_type(&self) -> Result<String, HostCallError> {
                    (**self).binary_type()
                }
            }
        )*
    };
}

forward_host_body!(&T, Box<T>, Arc<T>);

/// Names one call of the host surface, used to count and fail calls on a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCall {
    BodyType,
    Text,
    Json,
    Fields,
    Files,
    Binary,
    BinaryType,
}

impl HostCall {
    const COUNT: usize = 7;

    pub fn name(self) -> &'static str {
        match self {
            HostCall::BodyType => "type",
            HostCall::Text => "text",
            HostCall::Json => "json",
            HostCall::Fields => "fields",
            HostCall::Files => "files",
            HostCall::Binary => "binary",
            HostCall::BinaryType => "binary_type",
        }
    }
}

/// An upload held by a [`MemoryHost`].
#[derive(Debug, Clone)]
pub struct MemoryUpload {
    field: String,
    name: String,
    content_type: String,
    size: u64,
    bytes: Vec<u8>,
}

impl MemoryUpload {
    pub fn new(
        field: impl Into<String>,
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        let bytes = bytes.into();
        Self { field: field.into(), name: name.into(), content_type: content_type.into(), size: bytes.len() as u64, bytes }
    }

    /// Overrides the declared size reported to the body.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

/// An in-memory host body object.
///
/// Every call is counted, and any call can be made to fail with [`MemoryHost::fail_on`].
#[derive(Default)]
pub struct MemoryHost {
    body_type: Option<String>,
    text: Option<String>,
    json: Option<String>,
    fields: Option<String>,
    files: Option<Vec<MemoryUpload>>,
    binary: Option<Vec<u8>>,
    binary_type: Option<String>,
    failures: HashMap<HostCall, String>,
    calls: [AtomicUsize; HostCall::COUNT],
}

impl MemoryHost {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self { body_type: Some("text".into()), text: Some(text.into()), ..Self::default() }
    }

    pub fn json(json: impl Into<String>) -> Self {
        Self { body_type: Some("json".into()), json: Some(json.into()), ..Self::default() }
    }

    pub fn fields(fields: impl Into<String>) -> Self {
        Self { body_type: Some("fields".into()), fields: Some(fields.into()), ..Self::default() }
    }

    pub fn binary(bytes: impl Into<Vec<u8>>, mime: impl Into<String>) -> Self {
        Self {
            body_type: Some("bin".into()),
            binary: Some(bytes.into()),
            binary_type: Some(mime.into()),
            ..Self::default()
        }
    }

    /// Replaces the discriminator tag.
    pub fn with_type(mut self, body_type: Option<&str>) -> Self {
        self.body_type = body_type.map(Into::into);
        self
    }

    /// Appends an upload, creating the upload list if the host had none.
    pub fn with_file(mut self, upload: MemoryUpload) -> Self {
        self.files.get_or_insert_with(Vec::new).push(upload);
        self
    }

    /// Installs an empty upload list, as opposed to no list at all.
    pub fn with_empty_files(mut self) -> Self {
        self.files = Some(Vec::new());
        self
    }

    /// Makes `call` fail with `reason` every time it is made.
    pub fn fail_on(mut self, call: HostCall, reason: impl Into<String>) -> Self {
        self.failures.insert(call, reason.into());
        self
    }

    /// Returns how many times `call` was made.
    pub fn calls(&self, call: HostCall) -> usize {
        self.calls[call as usize].load(Ordering::SeqCst)
    }

    fn enter(&self, call: HostCall) -> Result<(), HostCallError> {
        self.calls[call as usize].fetch_add(1, Ordering::SeqCst);
        match self.failures.get(&call) {
            Some(reason) => Err(HostCallError::failed(call.name(), reason)),
            None => Ok(()),
        }
    }
}

impl HostBody for MemoryHost {
    fn body_type(&self) -> Option<&str> {
        self.calls[HostCall::BodyType as usize].fetch_add(1, Ordering::SeqCst);
        self.body_type.as_deref()
    }

    fn text(&self) -> Result<String, HostCallError> {
        self.enter(HostCall::Text)?;
        self.text.clone().ok_or_else(|| HostCallError::unsupported("text"))
    }

    fn json(&self) -> Result<String, HostCallError> {
        self.enter(HostCall::Json)?;
        self.json.clone().ok_or_else(|| HostCallError::unsupported("json"))
    }

    fn fields(&self) -> Result<String, HostCallError> {
        self.enter(HostCall::Fields)?;
        self.fields.clone().ok_or_else(|| HostCallError::unsupported("fields"))
    }

    fn files(&self) -> Result<Option<Vec<HostUpload<'_>>>, HostCallError> {
        self.enter(HostCall::Files)?;
        let uploads = self.files.as_ref().map(|files| {
            files
                .iter()
                .map(|f| HostUpload {
                    field: &f.field,
                    name: &f.name,
                    content_type: &f.content_type,
                    size: f.size,
                    bytes: &f.bytes,
                })
                .collect()
        });
        Ok(uploads)
    }

    fn binary(&self) -> Result<&[u8], HostCallError> {
        self.enter(HostCall::Binary)?;
        self.binary.as_deref().ok_or_else(|| HostCallError::unsupported("binary"))
    }

    fn binary_type(&self) -> Result<String, HostCallError> {
        self.enter(HostCall::BinaryType)?;
        self.binary_type.clone().ok_or_else(|| HostCallError::unsupported("binary_type"))
    }
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("body_type", &self.body_type)
            .field("files", &self.files.as_ref().map(Vec::len))
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}
