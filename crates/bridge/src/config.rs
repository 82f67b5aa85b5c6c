//! Bridge configuration.

use mime::Mime;

/// Controls how request content types map onto body kinds.
///
/// The default configuration is strict: only `text/plain`, `application/json`,
/// `application/x-www-form-urlencoded`, `multipart/form-data` and `application/octet-stream`
/// are accepted.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    default_binary_type: Mime,
    lenient_text: bool,
    unknown_as_binary: bool,
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// The mime reported for a binary body whose request carried no usable content type.
    pub fn default_binary_type(&self) -> &Mime {
        &self.default_binary_type
    }

    /// Whether every `text/*` content type is served as text.
    pub fn lenient_text(&self) -> bool {
        self.lenient_text
    }

    /// Whether unrecognized content types are served as binary instead of rejected.
    pub fn unknown_as_binary(&self) -> bool {
        self.unknown_as_binary
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfigBuilder::new().build()
    }
}

#[derive(Debug)]
pub struct BridgeConfigBuilder {
    default_binary_type: Option<Mime>,
    lenient_text: bool,
    unknown_as_binary: bool,
}

impl BridgeConfigBuilder {
    fn new() -> Self {
        Self { default_binary_type: None, lenient_text: false, unknown_as_binary: false }
    }

    pub fn default_binary_type(mut self, mime: Mime) -> Self {
        self.default_binary_type = Some(mime);
        self
    }

    pub fn lenient_text(mut self, lenient_text: bool) -> Self {
        self.lenient_text = lenient_text;
        self
    }

    pub fn unknown_as_binary(mut self, unknown_as_binary: bool) -> Self {
        self.unknown_as_binary = unknown_as_binary;
        self
    }

    pub fn build(self) -> BridgeConfig {
        BridgeConfig {
            default_binary_type: self.default_binary_type.unwrap_or(mime::APPLICATION_OCTET_STREAM),
            lenient_text: self.lenient_text,
            unknown_as_binary: self.unknown_as_binary,
        }
    }
}
