// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! JSON and typed-JSON formats

use super::{Format, FormatError, FormatResult, Mode, Source, parse_options, wrong_content};
use crate::Options;
use crate::content::Content;
use crate::model::{Envelope, ModelError, ModelRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
struct JsonWriteOptions {
    #[serde(default)]
    pretty: bool,
}

fn write_json<T: Serialize>(
    value: &T,
    sink: &mut (dyn Write + Send),
    options: &Options,
) -> FormatResult<()> {
    let options: JsonWriteOptions = parse_options(options)?;
    let result = if options.pretty {
        serde_json::to_writer_pretty(&mut *sink, value)
    } else {
        serde_json::to_writer(&mut *sink, value)
    };
    result.map_err(|e| FormatError::Encode(e.to_string()))?;
    sink.flush()?;
    Ok(())
}

fn read_json(source: &mut Source<'_>) -> FormatResult<Value> {
    let text = source.read_text()?;
    serde_json::from_str(&text).map_err(|e| FormatError::Decode(e.to_string()))
}

/// Plain JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Ok(Content::Json(read_json(&mut source)?))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        options: &Options,
    ) -> FormatResult<()> {
        match content {
            Content::Json(value) => write_json(value, sink, options),
            Content::Documents(docs) => write_json(docs, sink, options),
            other => Err(wrong_content("document", other)),
        }
    }
}

/// `{"model": <tag>, "contents": ...}` envelopes decoded through a
/// [`ModelRegistry`]. With a required tag, any other tag is rejected.
#[derive(Debug, Clone)]
pub struct TypedJsonFormat {
    models: Arc<ModelRegistry>,
    required_tag: Option<&'static str>,
}

impl TypedJsonFormat {
    #[must_use]
    pub fn new(models: Arc<ModelRegistry>) -> Self {
        Self {
            models,
            required_tag: None,
        }
    }

    #[must_use]
    pub fn restricted_to(models: Arc<ModelRegistry>, tag: &'static str) -> Self {
        Self {
            models,
            required_tag: Some(tag),
        }
    }

    fn check_tag(&self, tag: &str) -> FormatResult<()> {
        match self.required_tag {
            Some(required) if required != tag => Err(FormatError::UnknownTag(tag.to_string())),
            _ => Ok(()),
        }
    }
}

impl Format for TypedJsonFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        let value = read_json(&mut source)?;
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|e| FormatError::Decode(format!("not a typed-JSON envelope: {e}")))?;
        self.check_tag(&envelope.model)?;

        let model = self.models.decode(envelope).map_err(|e| match e {
            ModelError::UnknownTag(tag) => FormatError::UnknownTag(tag),
            invalid @ ModelError::Invalid { .. } => FormatError::Decode(invalid.to_string()),
        })?;
        Ok(Content::Model(model))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        options: &Options,
    ) -> FormatResult<()> {
        let Content::Model(model) = content else {
            return Err(wrong_content("model", content));
        };
        if let Some(required) = self.required_tag {
            if model.tag() != required {
                return Err(FormatError::Encode(format!(
                    "expected model '{required}', got '{}'",
                    model.tag()
                )));
            }
        }
        let envelope = model
            .to_envelope()
            .map_err(|e| FormatError::Encode(e.to_string()))?;
        write_json(&envelope, sink, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glue::{GLUE_TAG, GlueDb};
    use crate::model::TypedModel;
    use serde_json::json;

    fn decode(format: &dyn Format, text: &str) -> FormatResult<Content> {
        let mut reader = text.as_bytes();
        format.decode(Source::new(&mut reader), &Options::new())
    }

    #[test]
    fn test_json_nested_round_trip() {
        let value = json!({"a": [1, 2, {"b": null}], "c": "d"});
        let mut out = Vec::new();
        JsonFormat
            .encode(&Content::Json(value.clone()), &mut out, &Options::new())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(decode(&JsonFormat, &text).unwrap(), Content::Json(value));
    }

    #[test]
    fn test_json_pretty() {
        let mut out = Vec::new();
        JsonFormat
            .encode(
                &Content::Json(json!({"a": 1})),
                &mut out,
                &Options::new().with("pretty", true),
            )
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_json_invalid() {
        assert!(matches!(
            decode(&JsonFormat, "{not json"),
            Err(FormatError::Decode(_))
        ));
    }

    #[test]
    fn test_typed_unknown_tag() {
        let format = TypedJsonFormat::new(Arc::new(ModelRegistry::with_defaults().unwrap()));
        let err = decode(&format, r#"{"model": "no.such.Model", "contents": {}}"#).unwrap_err();
        assert!(matches!(err, FormatError::UnknownTag(tag) if tag == "no.such.Model"));
    }

    #[test]
    fn test_typed_missing_envelope() {
        let format = TypedJsonFormat::new(Arc::new(ModelRegistry::with_defaults().unwrap()));
        assert!(matches!(
            decode(&format, r#"{"contents": {}}"#),
            Err(FormatError::Decode(_))
        ));
    }

    #[test]
    fn test_restricted_rejects_other_tags() {
        #[derive(Debug, Serialize, Deserialize)]
        struct Other {
            x: i32,
        }
        impl crate::model::Model for Other {
            const TAG: &'static str = "tests.Other";
        }

        let models = Arc::new(ModelRegistry::with_defaults().unwrap());
        models.register::<Other>().unwrap();
        let format = TypedJsonFormat::restricted_to(models.clone(), GLUE_TAG);

        let err = decode(&format, r#"{"model": "tests.Other", "contents": {"x": 1}}"#).unwrap_err();
        assert!(matches!(err, FormatError::UnknownTag(_)));

        let mut out = Vec::new();
        let err = format
            .encode(
                &Content::Model(TypedModel::new(Other { x: 1 })),
                &mut out,
                &Options::new(),
            )
            .unwrap_err();
        assert!(matches!(err, FormatError::Encode(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_glue_round_trip() {
        let models = Arc::new(ModelRegistry::with_defaults().unwrap());
        let format = TypedJsonFormat::restricted_to(models, GLUE_TAG);

        let mut db = GlueDb::<Value>::new();
        db.post("alpha", json!({"k": 1})).unwrap();
        db.post("beta", json!([1, 2])).unwrap();
        let content = Content::Model(TypedModel::new(db));

        let mut out = Vec::new();
        format.encode(&content, &mut out, &Options::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let back = decode(&format, &text).unwrap();
        assert_eq!(back, content);

        let db = back
            .as_model()
            .and_then(|m| m.downcast_ref::<GlueDb<Value>>())
            .unwrap();
        assert_eq!(db.names(), vec!["alpha", "beta"]);
    }
}
