use bytes::Bytes;
use mime::{FromStrError, Mime};

/// A binary body copied out of the host, together with its mime classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPayload {
    bytes: Bytes,
    mime: String,
}

impl BinaryPayload {
    pub(crate) fn new(bytes: Bytes, mime: String) -> Self {
        Self { bytes, mime }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The mime string exactly as the host reported it.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn mime_type(&self) -> Result<Mime, FromStrError> {
        self.mime.parse()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the first `n` bytes, or the whole payload when it is shorter.
    pub fn head(&self, n: usize) -> &[u8] {
        &self.bytes[..n.min(self.bytes.len())]
    }
}
