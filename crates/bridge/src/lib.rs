//! Bridges http requests into [`micro_body::Body`] values.
//!
//! This crate is the request side of the host boundary. It collects a request body, classifies
//! it by `Content-Type` and decodes it into an [`HttpHostBody`], a host body object that serves
//! every [`micro_body::HostBody`] call synchronously.
//!
//! | content type                        | body kind | served as                          |
//! |-------------------------------------|-----------|------------------------------------|
//! | none                                | none      | nothing                            |
//! | `text/plain`                        | text      | text, invalid utf-8 replaced       |
//! | `application/json`                  | json      | validated json, as sent            |
//! | `application/x-www-form-urlencoded` | fields    | json field map                     |
//! | `multipart/form-data`               | fields    | json field map and uploaded files  |
//! | `application/octet-stream`          | binary    | raw bytes and mime                 |
//!
//! Other content types are rejected unless [`BridgeConfig`] says otherwise.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use http::Request;
//! use http_body_util::Full;
//! use micro_body_bridge::{bridge_request, BridgeConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let request = Request::builder()
//!     .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
//!     .body(Full::new(Bytes::from_static(b"name=zava&zip=100000")))?;
//!
//! let request = bridge_request(request, &BridgeConfig::default()).await?;
//! let fields: std::collections::HashMap<String, String> = request.body().fields()?;
//! assert_eq!(fields["name"], "zava");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod host;
mod request;

pub mod classify;
pub mod multipart;

mod utils;
pub(crate) use utils::ensure;

pub use config::BridgeConfig;
pub use config::BridgeConfigBuilder;
pub use error::BridgeError;
pub use host::HttpHostBody;
pub use request::bridge_parts;
pub use request::bridge_request;
