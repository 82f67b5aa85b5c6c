//! The per-request body.
//!
//! A [`Body`] wraps a host body object and serves exactly one representation, chosen by the
//! [`Kind`] classified at construction. Every accessor checks the kind first; calling the
//! wrong accessor is a [`BodyError::KindMismatch`] and never reaches the host.
//!
//! Raw retrievals go through a [`Memo`], so each one crosses the host boundary at most once
//! per body no matter how many threads call the accessor. Decoding into a caller type happens
//! on every call, because different callers may ask for different shapes.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::host::HostBody;
use crate::memo::Memo;
use crate::{BinaryPayload, BodyError, HostCallError, Kind, UploadFile};

#[derive(Debug)]
pub struct Body<H> {
    host: H,
    kind: Kind,
    text: Memo<String>,
    json: Memo<String>,
    fields: Memo<String>,
    binary: Memo<BinaryPayload>,
}

impl<H: HostBody> Body<H> {
    /// Creates a body over `host`, reading its discriminator exactly once.
    pub fn new(host: H) -> Self {
        let kind = Kind::from_tag(host.body_type());
        trace!(%kind, "classified request body");
        Self { host, kind, text: Memo::new(), json: Memo::new(), fields: Memo::new(), binary: Memo::new() }
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the underlying host object.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Succeeds only when the body carries nothing.
    pub fn none(&self) -> Result<(), BodyError> {
        self.expect(Kind::None)
    }

    /// Returns the body text verbatim.
    pub fn text(&self) -> Result<&str, BodyError> {
        self.expect(Kind::Text)?;
        let text = self.text.get_or_fetch(|| fetch("text", || self.host.text()))?;
        Ok(text.as_str())
    }

    /// Returns the encoded structured payload without decoding it.
    pub fn raw_json(&self) -> Result<&str, BodyError> {
        self.expect(Kind::Json)?;
        let raw = self.json.get_or_fetch(|| fetch("json", || self.host.json()))?;
        Ok(raw.as_str())
    }

    /// Decodes the structured payload into `T`.
    ///
    /// The raw payload is fetched once; decoding runs on every call. A malformed payload fails
    /// each decode attempt with [`BodyError::Decode`] but leaves the cached payload untouched.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let raw = self.raw_json()?;
        serde_json::from_str(raw).map_err(|e| BodyError::decode(Kind::Json, e))
    }

    /// Returns the encoded field map without decoding it.
    pub fn raw_fields(&self) -> Result<&str, BodyError> {
        self.expect(Kind::Fields)?;
        let raw = self.fields.get_or_fetch(|| fetch("fields", || self.host.fields()))?;
        Ok(raw.as_str())
    }

    /// Decodes the form fields into `T`.
    ///
    /// Text fields appear as strings. File fields appear as objects with `name`, `size` and
    /// `type`; their contents are served by [`Body::files`].
    pub fn fields<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let raw = self.raw_fields()?;
        serde_json::from_str(raw).map_err(|e| BodyError::decode(Kind::Fields, e))
    }

    /// Copies every upload out of the host.
    ///
    /// The upload list is read fresh on each call and each call returns independent copies. A
    /// host without an upload list yields an empty list.
    pub fn files(&self) -> Result<Vec<UploadFile>, BodyError> {
        self.expect(Kind::Fields)?;

        let Some(uploads) = fetch("files", || self.host.files())? else {
            trace!("host reported no upload list");
            return Ok(Vec::new());
        };

        let files = uploads.iter().map(UploadFile::copy_from_host).collect::<Result<Vec<_>, _>>()?;
        trace!(count = files.len(), "copied uploads from host");
        Ok(files)
    }

    /// Returns the binary payload and its mime classification.
    ///
    /// The byte buffer and the mime string are fetched together under one guard: if copying the
    /// buffer fails the mime string is never requested, and a failure of either is cached for
    /// both.
    pub fn binary(&self) -> Result<&BinaryPayload, BodyError> {
        self.expect(Kind::Binary)?;
        let payload = self.binary.get_or_fetch(|| {
            let bytes = fetch("binary", || self.host.binary().map(Bytes::copy_from_slice))?;
            trace!(len = bytes.len(), "copied binary body from host");
            let mime = fetch("binary_type", || self.host.binary_type())?;
            Ok(BinaryPayload::new(bytes, mime))
        })?;
        Ok(payload)
    }

    fn expect(&self, expected: Kind) -> Result<(), BodyError> {
        if self.kind == expected {
            Ok(())
        } else {
            debug!(%expected, actual = %self.kind, "request body kind mismatch");
            Err(BodyError::kind_mismatch(expected, self.kind))
        }
    }
}

fn fetch<T, F>(call: &'static str, f: F) -> Result<T, HostCallError>
where
    F: FnOnce() -> Result<T, HostCallError>,
{
    trace!(call, "calling host");
    f().inspect_err(|e| warn!(call, cause = %e, "host call failed"))
}

#[cfg(test)]
mod tests {
    use super::Body;
    use crate::host::{HostCall, MemoryHost, MemoryUpload};
    use crate::{BodyError, HostCallError, Kind};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::Barrier;
    use std::thread;

    fn check_send_sync<T: Send + Sync>() {}

    #[test]
    fn is_send_and_sync() {
        check_send_sync::<Body<MemoryHost>>();
        check_send_sync::<Body<Box<dyn crate::host::HostBody>>>();
    }

    #[test]
    fn test_kind_is_read_once() {
        let body = Body::new(MemoryHost::text("hello"));
        for _ in 0..3 {
            assert_eq!(body.kind(), Kind::Text);
        }
        let _ = body.text();
        assert_eq!(body.host().calls(HostCall::BodyType), 1);
    }

    #[test]
    fn test_unknown_tag_is_none() {
        let body = Body::new(MemoryHost::text("hello").with_type(Some("yaml")));
        assert_eq!(body.kind(), Kind::None);
        assert!(body.none().is_ok());
        assert!(body.text().unwrap_err().is_kind_mismatch());
        assert_eq!(body.host().calls(HostCall::Text), 0);
    }

    #[test]
    fn test_text() {
        let body = Body::new(MemoryHost::text("hello world"));

        assert_eq!(body.text().unwrap(), "hello world");
        assert_eq!(body.text().unwrap(), "hello world");
        assert_eq!(body.host().calls(HostCall::Text), 1);
        assert!(body.none().unwrap_err().is_kind_mismatch());
    }

    #[test]
    fn test_json_fetches_once() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            name: String,
            age: u32,
        }

        let body = Body::new(MemoryHost::json(r#"{"name":"zava","age":30}"#));

        for _ in 0..10 {
            let user: User = body.json().unwrap();
            assert_eq!(user, User { name: "zava".into(), age: 30 });
        }
        let value: serde_json::Value = body.json().unwrap();
        assert_eq!(value["age"], 30);

        assert_eq!(body.host().calls(HostCall::Json), 1);
    }

    #[test]
    fn test_text_on_json_body_always_mismatches() {
        let body = Body::new(MemoryHost::json("{}"));

        for _ in 0..5 {
            match body.text() {
                Err(BodyError::KindMismatch { expected, actual }) => {
                    assert_eq!(expected, Kind::Text);
                    assert_eq!(actual, Kind::Json);
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(body.host().calls(HostCall::Text), 0);
        assert_eq!(body.host().calls(HostCall::Json), 0);
    }

    #[test]
    fn test_malformed_json_fails_every_decode() {
        let body = Body::new(MemoryHost::json("{not json"));

        for _ in 0..3 {
            let err = body.json::<serde_json::Value>().unwrap_err();
            assert!(err.is_decode());
        }
        assert_eq!(body.raw_json().unwrap(), "{not json");
        assert_eq!(body.host().calls(HostCall::Json), 1);
    }

    #[test]
    fn test_decode_shape_differs_per_call() {
        let body = Body::new(MemoryHost::json(r#"{"a":1}"#));

        assert!(body.json::<HashMap<String, u8>>().is_ok());
        assert!(body.json::<Vec<u8>>().unwrap_err().is_decode());
        assert!(body.json::<HashMap<String, u8>>().is_ok());
    }

    #[test]
    fn test_host_failure_is_cached() {
        let body = Body::new(MemoryHost::text("unused").fail_on(HostCall::Text, "detached"));

        for _ in 0..4 {
            let err = body.text().unwrap_err();
            assert_eq!(err.host_call_error(), Some(&HostCallError::failed("text", "detached")));
        }
        assert_eq!(body.host().calls(HostCall::Text), 1);
    }

    #[test]
    fn test_fields_and_files() {
        let host = MemoryHost::fields(r#"{"foo":"bar","baz":"1"}"#).with_file(MemoryUpload::new(
            "greeting",
            "hello.txt",
            "text/plain",
            b"Hello, world!".to_vec(),
        ));
        let body = Body::new(host);

        let fields: HashMap<String, String> = body.fields().unwrap();
        assert_eq!(fields["foo"], "bar");
        assert_eq!(fields["baz"], "1");

        let files = body.files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].field(), "greeting");
        assert_eq!(files[0].name(), "hello.txt");
        assert_eq!(files[0].content_type(), "text/plain");
        assert_eq!(files[0].size(), 13);
        assert_eq!(files[0].bytes().as_ref(), b"Hello, world!");
    }

    #[test]
    fn test_fields_fetch_once() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Form {
            foo: String,
            baz: String,
        }

        let body = Body::new(MemoryHost::fields(r#"{"foo":"bar","baz":"1"}"#));

        for _ in 0..10 {
            let form: Form = body.fields().unwrap();
            assert_eq!(form, Form { foo: "bar".into(), baz: "1".into() });
        }
        let map: HashMap<String, String> = body.fields().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(body.raw_fields().unwrap(), r#"{"foo":"bar","baz":"1"}"#);

        assert_eq!(body.host().calls(HostCall::Fields), 1);
    }

    #[test]
    fn test_malformed_fields_fail_every_decode() {
        let body = Body::new(MemoryHost::fields("{\"foo\":"));

        for _ in 0..3 {
            match body.fields::<HashMap<String, String>>() {
                Err(BodyError::Decode { kind, .. }) => assert_eq!(kind, Kind::Fields),
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(body.raw_fields().unwrap(), "{\"foo\":");
        assert_eq!(body.host().calls(HostCall::Fields), 1);
    }

    #[test]
    fn test_fields_on_json_body_mismatches() {
        let body = Body::new(MemoryHost::json("{}"));

        for _ in 0..3 {
            assert!(body.fields::<serde_json::Value>().unwrap_err().is_kind_mismatch());
            assert!(body.raw_fields().unwrap_err().is_kind_mismatch());
        }
        assert_eq!(body.host().calls(HostCall::Fields), 0);
        assert_eq!(body.host().calls(HostCall::Json), 0);
    }

    #[test]
    fn test_files_are_read_fresh_each_call() {
        let host = MemoryHost::fields("{}").with_file(MemoryUpload::new("a", "a.txt", "text/plain", b"abc".to_vec()));
        let body = Body::new(host);

        let first = body.files().unwrap();
        let second = body.files().unwrap();

        assert_eq!(first, second);
        assert_ne!(first[0].bytes().as_ptr(), second[0].bytes().as_ptr());
        assert_eq!(body.host().calls(HostCall::Files), 2);
    }

    #[test]
    fn test_no_uploads_is_not_an_error() {
        let body = Body::new(MemoryHost::fields("{}"));
        assert!(body.files().unwrap().is_empty());

        let body = Body::new(MemoryHost::fields("{}").with_empty_files());
        assert!(body.files().unwrap().is_empty());
    }

    #[test]
    fn test_files_require_fields_kind() {
        let body = Body::new(MemoryHost::text("x"));
        assert!(body.files().unwrap_err().is_kind_mismatch());
        assert_eq!(body.host().calls(HostCall::Files), 0);
    }

    #[test]
    fn test_short_upload_fails_files() {
        let host = MemoryHost::fields("{}").with_file(MemoryUpload::new("a", "a.txt", "text/plain", b"abc".to_vec()).with_size(4));
        let body = Body::new(host);

        let err = body.files().unwrap_err();
        assert_eq!(err.host_call_error(), Some(&HostCallError::size_mismatch("a", 4, 3)));
    }

    #[test]
    fn test_binary() {
        let body = Body::new(MemoryHost::binary(vec![0x48, 0x65, 0x6C, 0x6C, 0x6F], "application/octet-stream"));

        let payload = body.binary().unwrap();
        assert_eq!(payload.len(), 5);
        assert_eq!(payload.mime(), "application/octet-stream");
        assert_eq!(payload.head(4), &[0x48, 0x65, 0x6C, 0x6C]);

        let again = body.binary().unwrap();
        assert_eq!(again.bytes().as_ptr(), payload.bytes().as_ptr());
    }

    #[test]
    fn test_binary_buffer_failure_skips_mime() {
        let body = Body::new(MemoryHost::binary(vec![1], "image/png").fail_on(HostCall::Binary, "moved"));

        for _ in 0..3 {
            let err = body.binary().unwrap_err();
            assert_eq!(err.host_call_error(), Some(&HostCallError::failed("binary", "moved")));
        }
        assert_eq!(body.host().calls(HostCall::Binary), 1);
        assert_eq!(body.host().calls(HostCall::BinaryType), 0);
    }

    #[test]
    fn test_binary_mime_failure_is_not_retried() {
        let body = Body::new(MemoryHost::binary(vec![1], "image/png").fail_on(HostCall::BinaryType, "gone"));

        assert!(body.binary().is_err());
        assert!(body.binary().is_err());
        assert_eq!(body.host().calls(HostCall::Binary), 1);
        assert_eq!(body.host().calls(HostCall::BinaryType), 1);
    }

    #[test]
    fn test_concurrent_binary() {
        const THREADS: usize = 32;

        let data: Vec<u8> = (0..=255).collect();
        let body = Body::new(MemoryHost::binary(data.clone(), "application/octet-stream"));
        let barrier = Barrier::new(THREADS);

        let results: Vec<(Vec<u8>, String)> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        let payload = body.binary().unwrap();
                        (payload.bytes().to_vec(), payload.mime().to_owned())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(body.host().calls(HostCall::Binary), 1);
        assert_eq!(body.host().calls(HostCall::BinaryType), 1);
        for (bytes, mime) in results {
            assert_eq!(bytes, data);
            assert_eq!(mime, "application/octet-stream");
        }
    }

    #[test]
    fn test_concurrent_json() {
        const THREADS: usize = 8;

        let body = Body::new(MemoryHost::json(r#"[1,2,3]"#));
        let barrier = Barrier::new(THREADS);

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    barrier.wait();
                    let v: Vec<u8> = body.json().unwrap();
                    assert_eq!(v, vec![1, 2, 3]);
                });
            }
        });

        assert_eq!(body.host().calls(HostCall::Json), 1);
    }
}
