//! In-memory payloads produced by reads and consumed by writes

use crate::loader::LoadedObject;
use crate::model::TypedModel;
use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::sync::Arc;

/// Tabular data. When `index` is set it names the first column, which
/// plays the role of the row labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
    index: Option<String>,
}

impl Table {
    /// A table without an index column
    #[must_use]
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch, index: None }
    }

    /// Promote column `index_col` to the index, moving it to the front.
    pub fn with_index_col(batch: RecordBatch, index_col: Option<usize>) -> Result<Self, String> {
        let Some(position) = index_col else {
            return Ok(Self::new(batch));
        };
        let schema = batch.schema();
        if position >= schema.fields().len() {
            return Err(format!(
                "index column {position} out of range for {} columns",
                schema.fields().len()
            ));
        }

        let mut order: Vec<usize> = vec![position];
        order.extend((0..schema.fields().len()).filter(|i| *i != position));

        let fields: Vec<Arc<Field>> = order.iter().map(|i| schema.fields()[*i].clone()).collect();
        let columns: Vec<ArrayRef> = order.iter().map(|i| batch.column(*i).clone()).collect();
        let name = schema.field(position).name().clone();
        let reordered = RecordBatch::try_new(
            Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone())),
            columns,
        )
        .map_err(|e| e.to_string())?;

        Ok(Self {
            batch: reordered,
            index: Some(name),
        })
    }

    /// Mark the existing first column as the index
    pub fn with_index_name(batch: RecordBatch, name: &str) -> Result<Self, String> {
        match batch.schema().fields().first() {
            Some(field) if field.name() == name => Ok(Self {
                batch,
                index: Some(name.to_string()),
            }),
            _ => Err(format!("index column '{name}' is not the first column")),
        }
    }

    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// The data columns only, index dropped
    pub fn without_index(&self) -> Result<RecordBatch, String> {
        if self.index.is_none() {
            return Ok(self.batch.clone());
        }
        let schema = self.batch.schema();
        let fields: Vec<Arc<Field>> = schema.fields().iter().skip(1).cloned().collect();
        let columns: Vec<ArrayRef> = self.batch.columns().iter().skip(1).cloned().collect();
        RecordBatch::try_new(
            Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone())),
            columns,
        )
        .map_err(|e| e.to_string())
    }
}

/// What a handler reads or writes
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Data frame (CSV, gzip CSV, parquet)
    Table(Table),
    /// One JSON or YAML document
    Json(Value),
    /// Ordered multi-document YAML stream
    Documents(Vec<Value>),
    /// Whole-file text
    Text(String),
    /// Raw bytes (web resources)
    Bytes(Vec<u8>),
    /// Typed-JSON model instance
    Model(TypedModel),
    /// In-process object resolved from a dotted path
    Object(LoadedObject),
}

impl Content {
    /// Short name used in messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Content::Table(_) => "table",
            Content::Json(_) => "document",
            Content::Documents(_) => "documents",
            Content::Text(_) => "text",
            Content::Bytes(_) => "bytes",
            Content::Model(_) => "model",
            Content::Object(_) => "object",
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Content::Table(table) => Some(table),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Content::Json(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_documents(&self) -> Option<&[Value]> {
        match self {
            Content::Documents(docs) => Some(docs),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Content::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_model(&self) -> Option<&TypedModel> {
        match self {
            Content::Model(model) => Some(model),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&LoadedObject> {
        match self {
            Content::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<Table> for Content {
    fn from(table: Table) -> Self {
        Content::Table(table)
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Json(value)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<TypedModel> for Content {
    fn from(model: TypedModel) -> Self {
        Content::Model(model)
    }
}
