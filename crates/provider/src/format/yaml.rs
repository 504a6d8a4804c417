// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML formats: one document, or a `---` separated document stream

use super::{Format, FormatError, FormatResult, Mode, Source, parse_options, wrong_content};
use crate::Options;
use crate::content::Content;
use serde::Deserialize;
use serde_json::Value;
use std::io::Write;

const DOCUMENT_SEPARATOR: &str = "---\n";

/// Parse exactly one YAML document
pub fn parse_document(text: &str) -> FormatResult<Value> {
    serde_yaml_ng::from_str(text).map_err(|e| FormatError::Decode(e.to_string()))
}

/// Parse every document of a YAML stream, in order. A stream with no
/// content, such as the one written for an empty sequence, has no documents.
pub fn parse_documents(text: &str) -> FormatResult<Vec<Value>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml_ng::Deserializer::from_str(text)
        .map(|document| {
            Value::deserialize(document).map_err(|e| FormatError::Decode(e.to_string()))
        })
        .collect()
}

fn to_yaml(value: &Value) -> FormatResult<String> {
    serde_yaml_ng::to_string(value).map_err(|e| FormatError::Encode(e.to_string()))
}

fn write_documents(docs: &[Value], sink: &mut (dyn Write + Send)) -> FormatResult<()> {
    for doc in docs {
        sink.write_all(DOCUMENT_SEPARATOR.as_bytes())?;
        sink.write_all(to_yaml(doc)?.as_bytes())?;
    }
    sink.flush()?;
    Ok(())
}

fn as_sequence(content: &Content) -> FormatResult<&[Value]> {
    match content {
        Content::Documents(docs) => Ok(docs),
        Content::Json(Value::Array(items)) => Ok(items),
        Content::Json(Value::Object(_)) => Err(FormatError::Unsupported(
            "write a mapping as a document stream".to_string(),
        )),
        Content::Json(_) => Err(FormatError::Unsupported(
            "write a scalar as a document stream".to_string(),
        )),
        other => Err(wrong_content("sequence", other)),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YamlWriteOptions {
    /// Write a sequence as one document per element
    #[serde(default)]
    documents: bool,
}

/// Single-document YAML
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDocFormat;

impl Format for YamlDocFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Ok(Content::Json(parse_document(&source.read_text()?)?))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        options: &Options,
    ) -> FormatResult<()> {
        let options: YamlWriteOptions = parse_options(options)?;
        if options.documents {
            return write_documents(as_sequence(content)?, sink);
        }
        let Content::Json(value) = content else {
            return Err(wrong_content("document", content));
        };
        sink.write_all(to_yaml(value)?.as_bytes())?;
        sink.flush()?;
        Ok(())
    }
}

/// Multi-document YAML stream
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDocsFormat;

impl Format for YamlDocsFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Ok(Content::Documents(parse_documents(&source.read_text()?)?))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        _options: &Options,
    ) -> FormatResult<()> {
        write_documents(as_sequence(content)?, sink)
    }
}
