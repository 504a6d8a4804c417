// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! CSV Format
//!
//! Tables as delimited text, with an optional gzip layer. The schema is
//! inferred from the data; `index_col` promotes one column to the table
//! index on read and `index` controls whether it is written back.

use super::{Format, FormatError, FormatResult, Mode, Source, parse_options, wrong_content};
use crate::compression::{compress, decompress};
use crate::content::{Content, Table};
use crate::Options;
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use arrow_csv::reader::Format as CsvDialect;
use arrow_csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;

/// CSV read options
///
/// Based on arrow_csv::reader::Format and ReaderBuilder options.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvReadOptions {
    /// Column promoted to the index (default: 0, `null` for none)
    #[serde(default)]
    pub index_col: Option<usize>,

    /// Whether the file has a header row (default: true)
    #[serde(default = "default_has_header")]
    pub has_header: bool,

    /// Field delimiter (default: ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Quote character (default: '"')
    #[serde(default = "default_quote")]
    pub quote: char,

    /// Escape character (default: None)
    pub escape: Option<char>,

    /// Stream compression, "gzip" or none
    pub compression: Option<String>,

    /// Rows sampled for schema inference (default: all)
    pub schema_infer_max_records: Option<usize>,

    /// Number of records per batch (default: 8192)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// CSV write options
#[derive(Debug, Clone, Deserialize)]
pub struct CsvWriteOptions {
    /// Write the index column (default: true)
    #[serde(default = "default_index")]
    pub index: bool,

    #[serde(default = "default_has_header")]
    pub has_header: bool,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    pub compression: Option<String>,
}

fn default_delimiter() -> char {
    ','
}
fn default_has_header() -> bool {
    true
}
fn default_quote() -> char {
    '"'
}
fn default_batch_size() -> usize {
    8192
}
fn default_index() -> bool {
    true
}

fn ascii(name: &str, c: char) -> FormatResult<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| FormatError::Options(format!("{name} must be a single ASCII character")))
}

/// Plain or gzip-compressed CSV tables
#[derive(Debug, Clone, Copy)]
pub struct CsvFormat {
    gzip: bool,
}

impl CsvFormat {
    #[must_use]
    pub fn plain() -> Self {
        Self { gzip: false }
    }

    #[must_use]
    pub fn gzip() -> Self {
        Self { gzip: true }
    }

    fn dialect(options: &CsvReadOptions) -> FormatResult<CsvDialect> {
        let mut dialect = CsvDialect::default()
            .with_delimiter(ascii("delimiter", options.delimiter)?)
            .with_header(options.has_header)
            .with_quote(ascii("quote", options.quote)?);
        if let Some(escape) = options.escape {
            dialect = dialect.with_escape(ascii("escape", escape)?);
        }
        Ok(dialect)
    }

    fn parse_table(bytes: &[u8], options: &CsvReadOptions) -> FormatResult<RecordBatch> {
        let dialect = Self::dialect(options)?;
        let (schema, _) = dialect
            .infer_schema(Cursor::new(bytes), options.schema_infer_max_records)
            .map_err(|e| FormatError::Decode(e.to_string()))?;
        let schema = Arc::new(schema);

        let mut builder = ReaderBuilder::new(schema.clone())
            .with_header(options.has_header)
            .with_delimiter(ascii("delimiter", options.delimiter)?)
            .with_quote(ascii("quote", options.quote)?)
            .with_batch_size(options.batch_size);
        if let Some(escape) = options.escape {
            builder = builder.with_escape(ascii("escape", escape)?);
        }
        let reader = builder
            .build(Cursor::new(bytes))
            .map_err(|e| FormatError::Decode(e.to_string()))?;

        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| FormatError::Decode(e.to_string()))?;
        concat_batches(&schema, &batches).map_err(|e| FormatError::Decode(e.to_string()))
    }
}

impl Format for CsvFormat {
    fn mode(&self) -> Mode {
        if self.gzip { Mode::Binary } else { Mode::Text }
    }

    fn read_defaults(&self) -> Options {
        let defaults = Options::new()
            .with("index_col", 0)
            .with("has_header", true)
            .with("delimiter", ",");
        if self.gzip {
            defaults.with("compression", "gzip")
        } else {
            defaults
        }
    }

    fn write_defaults(&self) -> Options {
        let defaults = Options::new()
            .with("index", true)
            .with("has_header", true)
            .with("delimiter", ",");
        if self.gzip {
            defaults.with("compression", "gzip")
        } else {
            defaults
        }
    }

    fn decode(&self, source: Source<'_>, options: &Options) -> FormatResult<Content> {
        let options: CsvReadOptions = parse_options(options)?;
        let mut reader = decompress(Box::new(source.reader), options.compression.as_deref())?;
        let mut bytes = Vec::new();
        let _ = reader.read_to_end(&mut bytes)?;

        let batch = Self::parse_table(&bytes, &options)?;
        let table = Table::with_index_col(batch, options.index_col).map_err(FormatError::Decode)?;
        Ok(Content::Table(table))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        options: &Options,
    ) -> FormatResult<()> {
        let Content::Table(table) = content else {
            return Err(wrong_content("table", content));
        };
        let options: CsvWriteOptions = parse_options(options)?;
        let batch = if options.index {
            table.batch().clone()
        } else {
            table.without_index().map_err(FormatError::Encode)?
        };

        let mut out = compress(sink, options.compression.as_deref())?;
        {
            let mut writer = WriterBuilder::new()
                .with_header(options.has_header)
                .with_delimiter(ascii("delimiter", options.delimiter)?)
                .build(&mut out);
            writer
                .write(&batch)
                .map_err(|e| FormatError::Encode(e.to_string()))?;
        }
        let _ = out.finish()?;
        Ok(())
    }
}
