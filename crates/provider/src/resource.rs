// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Stream backends
//!
//! A [`Resource`] is the thing a handler is bound to: a local file, a web
//! address, an in-process object, or a literal string. It opens readable
//! and writable streams; it does not interpret their bytes.

use crate::loader::ObjectLoader;
use crate::{Error, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum Target {
    Local(PathBuf),
    Http { url: url::Url, client: Client },
    Object { path: String, loader: Arc<ObjectLoader> },
    Literal(String),
}

#[derive(Debug, Clone)]
pub struct Resource {
    locator: String,
    target: Target,
}

impl Resource {
    pub fn new<L: Into<String>>(locator: L, target: Target) -> Self {
        Self {
            locator: locator.into(),
            target,
        }
    }

    #[must_use]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn local_path(&self) -> Option<&Path> {
        match &self.target {
            Target::Local(path) => Some(path),
            _ => None,
        }
    }

    fn backend_unsupported(&self, operation: &str) -> Error {
        Error::unsupported(&self.locator, self.backend_name(), operation)
    }

    /// Short backend name for messages
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        match &self.target {
            Target::Local(_) => "local",
            Target::Http { .. } => "http",
            Target::Object { .. } => "object",
            Target::Literal(_) => "literal",
        }
    }

    /// Whether the resource is there. Absence is `Ok(false)`; for web
    /// resources any transport failure also counts as absent.
    pub fn exists(&self) -> Result<bool> {
        match &self.target {
            Target::Local(path) => path.try_exists().map_err(|e| Error::io(&self.locator, e)),
            Target::Http { url, client } => match client.head(url.clone()).send() {
                Ok(response) => Ok(response.status().is_success()),
                Err(err) => {
                    diagnostics::debug!("HEAD {url} failed: {error}", url: url.as_str(), error: err.to_string());
                    Ok(false)
                }
            },
            Target::Object { path, loader } => Ok(loader.locate(path, false).is_ok()),
            Target::Literal(_) => Ok(true),
        }
    }

    pub fn open_read(&self) -> Result<Box<dyn Read + Send>> {
        match &self.target {
            Target::Local(path) => {
                let file = File::open(path).map_err(|e| Error::io(&self.locator, e))?;
                Ok(Box::new(BufReader::new(file)))
            }
            Target::Http { url, client } => {
                let response = client
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Error::transport(&self.locator, e))?;
                Ok(Box::new(response))
            }
            Target::Literal(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
            Target::Object { .. } => Err(self.backend_unsupported("open for reading")),
        }
    }

    /// Writable stream; parent directories are created as needed
    pub fn open_write(&self) -> Result<Box<dyn Write + Send>> {
        match &self.target {
            Target::Local(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| Error::io(&self.locator, e))?;
                }
                let file = File::create(path).map_err(|e| Error::io(&self.locator, e))?;
                Ok(Box::new(BufWriter::new(file)))
            }
            _ => Err(self.backend_unsupported("open for writing")),
        }
    }

    /// Delete one file. Directories are refused, never removed recursively.
    pub fn remove(&self) -> Result<()> {
        match &self.target {
            Target::Local(path) if path.is_dir() => {
                Err(self.backend_unsupported("remove a directory"))
            }
            Target::Local(path) => fs::remove_file(path).map_err(|e| Error::io(&self.locator, e)),
            _ => Err(self.backend_unsupported("remove")),
        }
    }
}
