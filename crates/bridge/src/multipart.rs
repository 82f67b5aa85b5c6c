//! `multipart/form-data` decoder.
//!
//! Splits a fully collected multipart body into [`Part`]s. Each part starts after a
//! `--boundary` delimiter line, carries its own header block and ends right before the next
//! `\r\n--boundary`. The body ends at `--boundary--`; anything after it, and any preamble
//! before the first delimiter, is ignored.
//!
//! Part headers are parsed with `httparse`, and part payloads are zero-copy slices of the
//! collected body.

use bytes::Bytes;
use httparse::Status;
use tracing::trace;

use crate::ensure;
use crate::BridgeError;

/// Maximum number of headers allowed in one part
const MAX_PART_HEADERS: usize = 16;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// The form field name from `Content-Disposition`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client filename, present for file parts only.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct MultipartDecoder {
    /// `--boundary`
    delimiter: Vec<u8>,
    /// `\r\n--boundary`
    separator: Vec<u8>,
}

impl MultipartDecoder {
    pub fn new(boundary: &str) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 2);
        delimiter.extend_from_slice(b"--");
        delimiter.extend_from_slice(boundary.as_bytes());

        let mut separator = Vec::with_capacity(delimiter.len() + 2);
        separator.extend_from_slice(CRLF);
        separator.extend_from_slice(&delimiter);

        Self { delimiter, separator }
    }

    pub fn decode(&self, body: &Bytes) -> Result<Vec<Part>, BridgeError> {
        let first = find(body, &self.delimiter).ok_or_else(|| BridgeError::invalid_multipart("missing opening boundary"))?;
        let mut pos = first + self.delimiter.len();
        let mut parts = Vec::new();

        loop {
            let rest = &body[pos..];
            if rest.starts_with(b"--") {
                break;
            }
            ensure!(rest.starts_with(CRLF), BridgeError::invalid_multipart("expected line break after boundary"));
            pos += CRLF.len();

            let mut headers = [httparse::EMPTY_HEADER; MAX_PART_HEADERS];
            let (consumed, headers) = match httparse::parse_headers(&body[pos..], &mut headers) {
                Ok(Status::Complete((consumed, headers))) => (consumed, headers),
                Ok(Status::Partial) => return Err(BridgeError::invalid_multipart("incomplete part headers")),
                Err(httparse::Error::TooManyHeaders) => {
                    return Err(BridgeError::invalid_multipart(format!("more than {MAX_PART_HEADERS} part headers")));
                }
                Err(e) => return Err(BridgeError::invalid_multipart(e)),
            };

            let start = pos + consumed;
            let len = find(&body[start..], &self.separator)
                .ok_or_else(|| BridgeError::invalid_multipart("missing closing boundary"))?;

            parts.push(Part::from_headers(headers, body.slice(start..start + len))?);
            pos = start + len + self.separator.len();
        }

        trace!(parts = parts.len(), "decoded multipart body");
        Ok(parts)
    }
}

impl Part {
    fn from_headers(headers: &[httparse::Header<'_>], data: Bytes) -> Result<Self, BridgeError> {
        let mut disposition = None;
        let mut content_type = None;

        for header in headers {
            let value = std::str::from_utf8(header.value)
                .map_err(|_| BridgeError::invalid_multipart(format!("non utf-8 `{}` part header", header.name)))?
                .trim();

            if header.name.eq_ignore_ascii_case("content-disposition") {
                disposition = Some(Disposition::parse(value)?);
            } else if header.name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
                content_type = Some(value.to_owned());
            }
        }

        let disposition = disposition.ok_or_else(|| BridgeError::invalid_multipart("part without content-disposition"))?;
        Ok(Part { name: disposition.name, filename: disposition.filename, content_type, data })
    }
}

/// The parts of `Content-Disposition: form-data; name="..."; filename="..."` a form needs.
#[derive(Debug)]
struct Disposition {
    name: String,
    filename: Option<String>,
}

impl Disposition {
    fn parse(value: &str) -> Result<Self, BridgeError> {
        let (disposition_type, params) = match value.find(';') {
            Some(i) => (value[..i].trim(), &value[i + 1..]),
            None => (value, ""),
        };
        ensure!(
            disposition_type.eq_ignore_ascii_case("form-data"),
            BridgeError::invalid_multipart(format!("unexpected disposition `{disposition_type}`"))
        );

        let mut name = None;
        let mut filename = None;
        for (key, value) in parse_parameters(params) {
            match key.as_str() {
                "name" => name = Some(value),
                "filename" => filename = Some(value),
                _ => {}
            }
        }

        let name = name.ok_or_else(|| BridgeError::invalid_multipart("form-data part without name"))?;
        Ok(Disposition { name, filename })
    }
}

/// Parses `; key=value; key="quoted \"value\""` pairs. Keys are lowercased; segments without
/// `=` are skipped.
fn parse_parameters(mut rest: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_ascii_whitespace());
        if rest.is_empty() {
            break;
        }

        let segment_end = rest.find(';').unwrap_or(rest.len());
        let Some(eq) = rest[..segment_end].find('=') else {
            rest = &rest[segment_end..];
            continue;
        };

        let key = rest[..eq].trim().to_ascii_lowercase();
        rest = rest[eq + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let mut value = String::new();
            let mut escaped = false;
            let mut end = quoted.len();
            for (i, c) in quoted.char_indices() {
                match c {
                    _ if escaped => {
                        value.push(c);
                        escaped = false;
                    }
                    '\\' => escaped = true,
                    '"' => {
                        end = i + 1;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            rest = &quoted[end..];
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let value = rest[..end].trim().to_owned();
            rest = &rest[end..];
            value
        };

        params.push((key, value));
    }

    params
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::{parse_parameters, MultipartDecoder};
    use crate::BridgeError;
    use bytes::Bytes;
    use indoc::indoc;

    fn crlf(s: &str) -> Bytes {
        Bytes::from(s.replace('\n', "\r\n"))
    }

    #[test]
    fn test_decode_fields_and_file() {
        let body = crlf(indoc! {r#"
            --XyZ
            Content-Disposition: form-data; name="foo"

            bar
            --XyZ
            Content-Disposition: form-data; name="greeting"; filename="hello.txt"
            Content-Type: text/plain

            Hello, world!
            --XyZ--
        "#});

        let parts = MultipartDecoder::new("XyZ").decode(&body).unwrap();
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].name(), "foo");
        assert!(!parts[0].is_file());
        assert_eq!(parts[0].content_type(), None);
        assert_eq!(parts[0].data().as_ref(), b"bar");

        assert_eq!(parts[1].name(), "greeting");
        assert_eq!(parts[1].filename(), Some("hello.txt"));
        assert_eq!(parts[1].content_type(), Some("text/plain"));
        assert_eq!(parts[1].data().as_ref(), b"Hello, world!");
    }

    #[test]
    fn test_preamble_epilogue_and_binary_payload() {
        let mut body = b"preamble\r\n--b\r\nContent-Disposition: form-data; name=raw; filename=x.bin\r\n\r\n".to_vec();
        body.extend_from_slice(&[0x00, 0xFF, b'\r', b'\n', 0x10]);
        body.extend_from_slice(b"\r\n--b--\r\nepilogue");

        let parts = MultipartDecoder::new("b").decode(&Bytes::from(body)).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name(), "raw");
        assert_eq!(parts[0].filename(), Some("x.bin"));
        assert_eq!(parts[0].data().as_ref(), &[0x00, 0xFF, b'\r', b'\n', 0x10]);
    }

    #[test]
    fn test_empty_part() {
        let body = crlf("--b\nContent-Disposition: form-data; name=\"empty\"\n\n\n--b--");
        let parts = MultipartDecoder::new("b").decode(&body).unwrap();
        assert_eq!(parts.len(), 1);
        assert!(parts[0].data().is_empty());
    }

    #[test]
    fn test_no_parts() {
        let parts = MultipartDecoder::new("b").decode(&Bytes::from_static(b"--b--\r\n")).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_invalid_bodies() {
        let decoder = MultipartDecoder::new("b");

        let missing_open = decoder.decode(&Bytes::from_static(b"nothing here"));
        assert!(matches!(missing_open, Err(BridgeError::InvalidMultipart { .. })));

        let missing_close = decoder.decode(&crlf("--b\nContent-Disposition: form-data; name=a\n\nvalue"));
        assert!(matches!(missing_close, Err(BridgeError::InvalidMultipart { .. })));

        let missing_disposition = decoder.decode(&crlf("--b\nContent-Type: text/plain\n\nvalue\n--b--"));
        assert!(matches!(missing_disposition, Err(BridgeError::InvalidMultipart { .. })));

        let missing_name = decoder.decode(&crlf("--b\nContent-Disposition: form-data\n\nvalue\n--b--"));
        assert!(matches!(missing_name, Err(BridgeError::InvalidMultipart { .. })));

        let wrong_disposition = decoder.decode(&crlf("--b\nContent-Disposition: attachment; name=a\n\nvalue\n--b--"));
        assert!(matches!(wrong_disposition, Err(BridgeError::InvalidMultipart { .. })));
    }

    #[test]
    fn test_parameters() {
        let params = parse_parameters(r#" name="a; b"; flag; filename="say \"hi\".txt"; size=10 "#);
        assert_eq!(
            params,
            vec![
                ("name".to_owned(), "a; b".to_owned()),
                ("filename".to_owned(), r#"say "hi".txt"#.to_owned()),
                ("size".to_owned(), "10".to_owned()),
            ]
        );
    }
}
