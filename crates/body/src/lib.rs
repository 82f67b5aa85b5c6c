//! A kind-gated, memoized request body bridged from a host-owned body object.
//!
//! The request body of a handler often lives on the other side of a runtime boundary: a host
//! owns the object and only exposes a handful of synchronous calls to read it. This crate turns
//! such an object into a [`Body`] with strongly typed accessors.
//!
//! # Features
//!
//! - The body [`Kind`] is classified once, at construction, from the host's discriminator tag
//! - Accessors are kind-gated: asking a json body for text is a [`BodyError::KindMismatch`]
//! - Each raw retrieval crosses the boundary at most once per body, even under concurrent
//!   first access, and failures are cached just like values (see [`memo::Memo`])
//! - Json and form payloads decode into any [`serde::de::DeserializeOwned`] type per call
//! - Host bytes are copied into owned [`bytes::Bytes`] before they are handed out
//!
//! # Example
//!
//! ```
//! use micro_body::host::{MemoryHost, MemoryUpload};
//! use micro_body::{Body, Kind};
//! use std::collections::HashMap;
//!
//! let host = MemoryHost::fields(r#"{"foo":"bar"}"#)
//!     .with_file(MemoryUpload::new("greeting", "hello.txt", "text/plain", b"Hello, world!".to_vec()));
//! let body = Body::new(host);
//!
//! assert_eq!(body.kind(), Kind::Fields);
//!
//! let fields: HashMap<String, String> = body.fields().unwrap();
//! assert_eq!(fields["foo"], "bar");
//!
//! let files = body.files().unwrap();
//! assert_eq!(files[0].size(), 13);
//! assert!(body.text().unwrap_err().is_kind_mismatch());
//! ```

mod binary;
mod body;
mod error;
mod kind;
mod upload;

pub mod host;
pub mod memo;

pub use binary::BinaryPayload;
pub use body::Body;
pub use error::BodyError;
pub use error::HostCallError;
pub use host::HostBody;
pub use host::HostUpload;
pub use kind::Kind;
pub use upload::UploadFile;
