// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Glue database: an append-only collection of uniquely named records,
//! persisted as a typed-JSON model by the `gluedb` handler.

use crate::model::Model;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Model tag of the glue container
pub const GLUE_TAG: &str = "swark.glue.GlueDb";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub name: String,
    pub contents: T,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record '{0}' already exists")]
pub struct DuplicateRecord(pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlueDb<T> {
    records: Vec<Record<T>>,
}

impl<T> Default for GlueDb<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T> GlueDb<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; names are unique
    pub fn post<N: Into<String>>(&mut self, name: N, contents: T) -> Result<(), DuplicateRecord> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(DuplicateRecord(name));
        }
        self.records.push(Record { name, contents });
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.records
            .iter()
            .find(|record| record.name == name)
            .map(|record| &record.contents)
    }

    /// Names in insertion order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    #[must_use]
    pub fn records(&self) -> &[Record<T>] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for GlueDb<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<T> {
            #[serde(default = "Vec::new")]
            records: Vec<Record<T>>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        let mut seen = HashSet::new();
        for record in &raw.records {
            if !seen.insert(record.name.as_str()) {
                return Err(serde::de::Error::custom(DuplicateRecord(
                    record.name.clone(),
                )));
            }
        }
        Ok(Self {
            records: raw.records,
        })
    }
}

impl<T> Model for GlueDb<T>
where
    T: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static,
{
    const TAG: &'static str = GLUE_TAG;
}
