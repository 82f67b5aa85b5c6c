use bytes::Bytes;
use mime::Mime;

use crate::host::HostUpload;
use crate::HostCallError;

/// A file attachment copied out of the host.
///
/// The bytes are a full local copy; nothing here aliases host memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    field: String,
    name: String,
    content_type: String,
    size: u64,
    bytes: Bytes,
}

impl UploadFile {
    /// Copies exactly `upload.size` bytes out of the host descriptor.
    ///
    /// Fails with [`HostCallError::SizeMismatch`] when the host buffer is shorter than the
    /// declared size; bytes past the declared size are not copied.
    pub(crate) fn copy_from_host(upload: &HostUpload<'_>) -> Result<Self, HostCallError> {
        let available = upload.bytes.len();
        let len = usize::try_from(upload.size)
            .ok()
            .filter(|len| *len <= available)
            .ok_or_else(|| HostCallError::size_mismatch(upload.field, upload.size, available))?;

        Ok(Self {
            field: upload.field.to_owned(),
            name: upload.name.to_owned(),
            content_type: upload.content_type.to_owned(),
            size: upload.size,
            bytes: Bytes::copy_from_slice(&upload.bytes[..len]),
        })
    }

    /// The form field the file was posted under.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The client supplied filename.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Parses the content type, `None` if the host reported something that is not a mime type.
    pub fn mime(&self) -> Option<Mime> {
        self.content_type.parse().ok()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
