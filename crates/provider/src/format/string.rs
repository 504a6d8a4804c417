// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Literal string content: YAML document, YAML stream, or JSON

use super::yaml::{parse_document, parse_documents};
use super::{Format, FormatError, FormatResult, Mode, Source};
use crate::Options;
use crate::content::Content;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct StringFormat;

impl StringFormat {
    /// Try a single YAML document, then a YAML stream, then JSON
    pub fn parse(text: &str) -> FormatResult<Content> {
        if let Ok(value) = parse_document(text) {
            return Ok(Content::Json(value));
        }
        if let Ok(docs) = parse_documents(text) {
            return Ok(Content::Documents(docs));
        }
        serde_json::from_str(text)
            .map(Content::Json)
            .map_err(|_| FormatError::Decode(format!("could not parse string: {text:?}")))
    }
}

impl Format for StringFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Self::parse(&source.read_text()?)
    }

    fn encode(
        &self,
        _content: &Content,
        _sink: &mut (dyn Write + Send),
        _options: &Options,
    ) -> FormatResult<()> {
        Err(FormatError::Unsupported("write".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yaml_and_json_lists_agree() {
        let expected = Content::Json(json!(["a", "b", {"c": 3}]));
        assert_eq!(StringFormat::parse("- a\n- b\n- c: 3\n").unwrap(), expected);

        let pretty = serde_json::to_string_pretty(&json!(["a", "b", {"c": 3}])).unwrap();
        assert_eq!(StringFormat::parse(&pretty).unwrap(), expected);
    }

    #[test]
    fn test_document_stream() {
        assert_eq!(
            StringFormat::parse("---\nx: 1\n---\ny: 2\n").unwrap(),
            Content::Documents(vec![json!({"x": 1}), json!({"y": 2})])
        );
    }

    #[test]
    fn test_unparseable_string_is_named() {
        let err = StringFormat::parse("key: [unclosed").unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }
}
