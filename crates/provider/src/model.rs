//! Typed-JSON models
//!
//! A typed-JSON file is an envelope `{"model": <tag>, "contents": <payload>}`.
//! Tags are resolved through an explicit [`ModelRegistry`]; a tag that was
//! never registered is rejected before any value is constructed.

use crate::glue::GlueDb;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// A serializable type that can travel in a typed-JSON envelope
pub trait Model: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    /// Identifier written to the envelope's `model` field
    const TAG: &'static str;
}

trait ErasedModel: fmt::Debug + Send + Sync {
    fn contents(&self) -> serde_json::Result<Value>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Model> ErasedModel for T {
    fn contents(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wire form of a typed-JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub model: String,
    pub contents: Value,
}

/// A decoded model instance together with its tag
#[derive(Debug, Clone)]
pub struct TypedModel {
    tag: String,
    value: Arc<dyn ErasedModel>,
}

impl TypedModel {
    pub fn new<T: Model>(value: T) -> Self {
        Self {
            tag: T::TAG.to_string(),
            value: Arc::new(value),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        self.value.as_any().downcast_ref::<T>()
    }

    pub fn contents(&self) -> serde_json::Result<Value> {
        self.value.contents()
    }

    pub fn to_envelope(&self) -> serde_json::Result<Envelope> {
        Ok(Envelope {
            model: self.tag.clone(),
            contents: self.contents()?,
        })
    }
}

impl PartialEq for TypedModel {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && matches!(
                (self.contents(), other.contents()),
                (Ok(a), Ok(b)) if a == b
            )
    }
}

/// Why an envelope could not become a [`TypedModel`]
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown model tag '{0}'")]
    UnknownTag(String),

    #[error("invalid contents for model '{tag}': {source}")]
    Invalid {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

type DecodeFn = fn(Value) -> serde_json::Result<TypedModel>;

fn decode_as<T: Model>(contents: Value) -> serde_json::Result<TypedModel> {
    serde_json::from_value::<T>(contents).map(TypedModel::new)
}

/// Tag -> constructor table for typed-JSON decoding
pub struct ModelRegistry {
    decoders: RwLock<BTreeMap<String, DecodeFn>>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl ModelRegistry {
    /// Registry with no models at all
    #[must_use]
    pub fn empty() -> Self {
        Self {
            decoders: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registry with the built-in models (the glue database)
    pub fn with_defaults() -> Result<Self> {
        let registry = Self::empty();
        registry.register::<GlueDb<Value>>()?;
        Ok(registry)
    }

    /// Make `T` decodable from envelopes tagged `T::TAG`
    pub fn register<T: Model>(&self) -> Result<()> {
        let mut decoders = self.decoders.write().unwrap_or_else(PoisonError::into_inner);
        if decoders.contains_key(T::TAG) {
            return Err(Error::DuplicateModel {
                tag: T::TAG.to_string(),
            });
        }
        let _ = decoders.insert(T::TAG.to_string(), decode_as::<T>);
        diagnostics::debug!("registered model {tag}", tag: T::TAG);
        Ok(())
    }

    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Build the model named by the envelope
    pub fn decode(&self, envelope: Envelope) -> std::result::Result<TypedModel, ModelError> {
        let decoder = self
            .decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&envelope.model)
            .copied()
            .ok_or_else(|| ModelError::UnknownTag(envelope.model.clone()))?;
        decoder(envelope.contents).map_err(|source| ModelError::Invalid {
            tag: envelope.model,
            source,
        })
    }
}
