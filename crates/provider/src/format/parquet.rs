// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Parquet Format
//!
//! Reads by local path when the resource has one (parquet needs random
//! access), otherwise buffers the stream. The table index name is carried
//! in the Arrow schema metadata under [`INDEX_METADATA_KEY`].

use super::{Format, FormatError, FormatResult, Mode, Source, parse_options, wrong_content};
use crate::Options;
use crate::content::{Content, Table};
use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::ChunkReader;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;

pub const INDEX_METADATA_KEY: &str = "swark.index";

#[derive(Debug, Clone, Deserialize)]
struct ParquetReadOptions {
    #[serde(default = "default_batch_size")]
    batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct ParquetWriteOptions {
    /// Keep the index column (default: true)
    #[serde(default = "default_index")]
    index: bool,

    /// "zstd" (default), "snappy" or "none"
    #[serde(default = "default_compression")]
    compression: String,
}

fn default_batch_size() -> usize {
    8192
}
fn default_index() -> bool {
    true
}
fn default_compression() -> String {
    "zstd".to_string()
}

fn decode_err(e: impl std::fmt::Display) -> FormatError {
    FormatError::Decode(e.to_string())
}

fn encode_err(e: impl std::fmt::Display) -> FormatError {
    FormatError::Encode(e.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetFormat;

impl ParquetFormat {
    fn read_table<R: ChunkReader + 'static>(
        input: R,
        options: &ParquetReadOptions,
    ) -> FormatResult<Table> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(input).map_err(decode_err)?;
        let schema = builder.schema().clone();
        let reader = builder
            .with_batch_size(options.batch_size)
            .build()
            .map_err(decode_err)?;
        let batches = reader.collect::<Result<Vec<_>, _>>().map_err(decode_err)?;
        let batch = concat_batches(&schema, &batches).map_err(decode_err)?;

        let mut metadata = schema.metadata().clone();
        let index = metadata.remove(INDEX_METADATA_KEY);
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new_with_metadata(schema.fields().clone(), metadata)),
            batch.columns().to_vec(),
        )
        .map_err(decode_err)?;

        match index {
            Some(name) => Table::with_index_name(batch, &name).map_err(FormatError::Decode),
            None => Ok(Table::new(batch)),
        }
    }

    fn properties(options: &ParquetWriteOptions) -> FormatResult<WriterProperties> {
        let compression = match options.compression.as_str() {
            "zstd" => Compression::ZSTD(ZstdLevel::try_new(6).map_err(encode_err)?),
            "snappy" => Compression::SNAPPY,
            "none" => Compression::UNCOMPRESSED,
            other => {
                return Err(FormatError::Options(format!(
                    "Unsupported parquet compression: {other}"
                )));
            }
        };
        Ok(WriterProperties::builder()
            .set_compression(compression)
            .build())
    }
}

impl Format for ParquetFormat {
    fn mode(&self) -> Mode {
        Mode::Binary
    }

    fn decode(&self, mut source: Source<'_>, options: &Options) -> FormatResult<Content> {
        let options: ParquetReadOptions = parse_options(options)?;
        let table = match source.path {
            Some(path) => Self::read_table(File::open(path)?, &options)?,
            None => Self::read_table(Bytes::from(source.read_all()?), &options)?,
        };
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
        let options: ParquetWriteOptions = parse_options(options)?;

        let batch = if options.index {
            table.batch().clone()
        } else {
            table.without_index().map_err(FormatError::Encode)?
        };
        let mut metadata: HashMap<String, String> = batch.schema().metadata().clone();
        if let (true, Some(index)) = (options.index, table.index()) {
            let _ = metadata.insert(INDEX_METADATA_KEY.to_string(), index.to_string());
        }
        let schema = Arc::new(Schema::new_with_metadata(
            batch.schema().fields().clone(),
            metadata,
        ));
        let batch = RecordBatch::try_new(schema.clone(), batch.columns().to_vec()).map_err(encode_err)?;

        let props = Self::properties(&options)?;
        let mut writer = ArrowWriter::try_new(sink, schema, Some(props)).map_err(encode_err)?;
        writer.write(&batch).map_err(encode_err)?;
        let _ = writer.close().map_err(encode_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{DataType, Field};

    fn sample() -> Table {
        let schema = Arc::new(Schema::new(vec![
            Field::new("station", DataType::Utf8, true),
            Field::new("level", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec!["north", "south"])),
                Arc::new(Float64Array::from(vec![1.5, 2.25])),
            ],
        )
        .unwrap();
        Table::with_index_col(batch, Some(0)).unwrap()
    }

    fn encode(table: &Table, options: &Options) -> Vec<u8> {
        let mut out = Vec::new();
        ParquetFormat
            .encode(&Content::Table(table.clone()), &mut out, options)
            .unwrap();
        out
    }

    #[test]
    fn test_round_trip_from_stream() {
        let table = sample();
        let bytes = encode(&table, &Options::new());
        assert_eq!(&bytes[..4], b"PAR1");

        let mut reader: &[u8] = &bytes;
        let content = ParquetFormat
            .decode(Source::new(&mut reader), &Options::new())
            .unwrap();
        assert_eq!(content, Content::Table(table));
    }

    #[test]
    fn test_round_trip_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.parquet");
        let table = sample();
        std::fs::write(&path, encode(&table, &Options::new())).unwrap();

        let mut unused: &[u8] = &[];
        let content = ParquetFormat
            .decode(
                Source::new(&mut unused).with_path(Some(path.as_path())),
                &Options::new(),
            )
            .unwrap();
        assert_eq!(content.as_table().unwrap().index(), Some("station"));
        assert_eq!(content, Content::Table(table));
    }

    #[test]
    fn test_write_without_index() {
        let bytes = encode(&sample(), &Options::new().with("index", false));
        let mut reader: &[u8] = &bytes;
        let content = ParquetFormat
            .decode(Source::new(&mut reader), &Options::new())
            .unwrap();
        let table = content.as_table().unwrap();
        assert_eq!(table.index(), None);
        assert_eq!(table.batch().num_columns(), 1);
    }

    #[test]
    fn test_unknown_compression() {
        let mut out = Vec::new();
        let err = ParquetFormat
            .encode(
                &Content::Table(sample()),
                &mut out,
                &Options::new().with("compression", "lz9"),
            )
            .unwrap_err();
        assert!(matches!(err, FormatError::Options(_)));
    }
}
