//! Body kind classification.
//!
//! The host object carries a discriminator tag describing which representation it can serve.
//! The tag is read once when a [`Body`](crate::Body) is constructed and mapped to a [`Kind`];
//! unknown or missing tags degrade to [`Kind::None`] instead of failing.

use std::fmt;

/// The immutable classification of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    /// no body, or a tag this crate does not understand
    #[default]
    None,
    /// plain text, served verbatim
    Text,
    /// structured data encoded as json
    Json,
    /// form fields, optionally with file attachments
    Fields,
    /// raw bytes with a mime classification
    Binary,
}

impl Kind {
    /// Maps a host discriminator tag to a kind.
    ///
    /// Matching is exact: `"text"`, `"json"`, `"fields"` and `"bin"`. Everything else,
    /// including an absent tag, is [`Kind::None`].
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("text") => Kind::Text,
            Some("json") => Kind::Json,
            Some("fields") => Kind::Fields,
            Some("bin") => Kind::Binary,
            _ => Kind::None,
        }
    }

    /// Returns the canonical discriminator tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Kind::None => "none",
            Kind::Text => "text",
            Kind::Json => "json",
            Kind::Fields => "fields",
            Kind::Binary => "bin",
        }
    }
}

impl From<&str> for Kind {
    #[inline]
    fn from(tag: &str) -> Self {
        Kind::from_tag(Some(tag))
    }
}

/// Human readable names for messages. `Binary` reads as "binary" here; use [`Kind::tag`] for
/// the discriminator tag.
impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::None => "none",
            Kind::Text => "text",
            Kind::Json => "json",
            Kind::Fields => "fields",
            Kind::Binary => "binary",
        };
        f.write_str(name)
    }
}
