// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Format codecs
//!
//! A [`Format`] turns an opened byte stream into [`Content`] and back. It
//! knows nothing about locators or backends: the handler opens the stream,
//! merges options, and maps [`FormatError`] onto the provider error with
//! the locator attached.

use crate::Options;
use crate::content::Content;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::path::Path;

pub mod csv;
pub mod json;
pub mod parquet;
pub mod string;
pub mod text;
pub mod yaml;

pub use self::csv::CsvFormat;
pub use self::json::{JsonFormat, TypedJsonFormat};
pub use self::parquet::ParquetFormat;
pub use self::string::StringFormat;
pub use self::text::{BytesFormat, TextFormat};
pub use self::yaml::{YamlDocFormat, YamlDocsFormat};

/// How the underlying stream is treated. Text formats must encode valid
/// UTF-8; a write that doesn't is rejected before the resource is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Binary,
}

/// Readable side of a resource handed to [`Format::decode`]
pub struct Source<'a> {
    pub reader: &'a mut (dyn Read + Send),
    /// Local path of the resource, for formats that prefer random access
    pub path: Option<&'a Path>,
}

impl<'a> Source<'a> {
    pub fn new(reader: &'a mut (dyn Read + Send)) -> Self {
        Self { reader, path: None }
    }

    #[must_use]
    pub fn with_path(mut self, path: Option<&'a Path>) -> Self {
        self.path = path;
        self
    }

    /// Whole stream as bytes
    pub fn read_all(&mut self) -> FormatResult<Vec<u8>> {
        let mut buf = Vec::new();
        let _ = self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Whole stream as UTF-8 text
    pub fn read_text(&mut self) -> FormatResult<String> {
        let bytes = self.read_all()?;
        String::from_utf8(bytes).map_err(|e| FormatError::Decode(format!("invalid UTF-8: {e}")))
    }
}

/// Codec failure without locator context
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),

    #[error("unknown model tag '{0}'")]
    UnknownTag(String),

    /// Operation name, e.g. "write mapping as document stream"
    #[error("{0}")]
    Unsupported(String),

    #[error("{0}")]
    Options(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Deserialize merged options into a format's option struct
pub fn parse_options<T: DeserializeOwned>(options: &Options) -> FormatResult<T> {
    options.parse().map_err(FormatError::Options)
}

/// Encode/decode body of a handler
pub trait Format: Send + Sync + std::fmt::Debug {
    fn mode(&self) -> Mode;

    /// Options laid under the caller's options on read
    fn read_defaults(&self) -> Options {
        Options::new()
    }

    /// Options laid under the caller's options on write
    fn write_defaults(&self) -> Options {
        Options::new()
    }

    fn decode(&self, source: Source<'_>, options: &Options) -> FormatResult<Content>;

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        options: &Options,
    ) -> FormatResult<()>;
}

/// Error for content that a format cannot encode
pub(crate) fn wrong_content(expected: &str, content: &Content) -> FormatError {
    FormatError::Encode(format!(
        "expected {expected} content, got {}",
        content.kind_name()
    ))
}
