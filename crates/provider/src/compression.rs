// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Stream compression
//!
//! Wraps readers and writers with (de)compression selected by name.
//! Format-agnostic: any handler can request it through its `compression`
//! option.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{self, Read, Write};

fn unsupported(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("Unsupported compression: {name}"),
    )
}

/// Wrap a reader with decompression based on compression type.
///
/// Supported compressions: "gzip". Returns the same reader if compression
/// is "none" or None.
pub fn decompress<'a>(
    reader: Box<dyn Read + Send + 'a>,
    compression: Option<&str>,
) -> io::Result<Box<dyn Read + Send + 'a>> {
    match compression {
        None | Some("none") => Ok(reader),
        Some("gzip") => Ok(Box::new(GzDecoder::new(reader))),
        Some(other) => Err(unsupported(other)),
    }
}

/// Writer returned by [`compress`]; call [`CompressedWriter::finish`] to
/// flush the trailer.
pub enum CompressedWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> CompressedWriter<W> {
    /// Flush everything and hand back the inner writer
    pub fn finish(self) -> io::Result<W> {
        match self {
            CompressedWriter::Plain(mut inner) => {
                inner.flush()?;
                Ok(inner)
            }
            CompressedWriter::Gzip(encoder) => {
                let mut inner = encoder.finish()?;
                inner.flush()?;
                Ok(inner)
            }
        }
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            CompressedWriter::Plain(inner) => inner.write(buf),
            CompressedWriter::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            CompressedWriter::Plain(inner) => inner.flush(),
            CompressedWriter::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// Wrap a writer with compression based on compression type.
pub fn compress<W: Write>(writer: W, compression: Option<&str>) -> io::Result<CompressedWriter<W>> {
    match compression {
        None | Some("none") => Ok(CompressedWriter::Plain(writer)),
        Some("gzip") => Ok(CompressedWriter::Gzip(GzEncoder::new(
            writer,
            Compression::default(),
        ))),
        Some(other) => Err(unsupported(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompress_none() {
        let data = b"hello world";
        let mut decompressed = decompress(Box::new(&data[..]), None).unwrap();

        let mut result = String::new();
        let _ = decompressed.read_to_string(&mut result).unwrap();
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_decompress_invalid() {
        let data = b"hello world";
        let result = decompress(Box::new(&data[..]), Some("invalid"));
        let err = result.err().unwrap();
        assert!(err.to_string().contains("Unsupported compression"));
    }

    #[test]
    fn test_gzip_round_trip() {
        let mut writer = compress(Vec::new(), Some("gzip")).unwrap();
        writer.write_all(b"a,b\n1,2\n").unwrap();
        let compressed = writer.finish().unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);

        let mut reader = decompress(Box::new(&compressed[..]), Some("gzip")).unwrap();
        let mut text = String::new();
        let _ = reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "a,b\n1,2\n");
    }
}
