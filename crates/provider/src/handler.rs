// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Handler: one registered format bound to one resource
//!
//! Handlers are cheap, hold no open streams, and cache nothing. Each
//! operation opens what it needs and releases it before returning, on
//! success and on failure alike.
//!
//! Concurrent operations on the same resource are not coordinated: an
//! overwrite racing a read may expose a partially written file. Callers
//! that share resources across threads serialize access themselves.

use crate::content::Content;
use crate::format::{Format, FormatError, Mode, Source};
use crate::model::ModelRegistry;
use crate::registry::HandlerEntry;
use crate::resource::{Resource, Target};
use crate::{Error, Options, Result};
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Handler {
    entry: Arc<HandlerEntry>,
    resource: Resource,
    models: Arc<ModelRegistry>,
}

impl Handler {
    pub(crate) fn new(
        entry: Arc<HandlerEntry>,
        resource: Resource,
        models: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            entry,
            resource,
            models,
        }
    }

    /// Canonical handler name
    #[must_use]
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    #[must_use]
    pub fn locator(&self) -> &str {
        self.resource.locator()
    }

    #[must_use]
    pub fn entry(&self) -> &HandlerEntry {
        &self.entry
    }

    #[must_use]
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    fn format(&self) -> Result<Arc<dyn Format>> {
        self.entry
            .kind()
            .format(&self.models)
            .ok_or_else(|| Error::unsupported(self.locator(), self.name(), "stream access"))
    }

    fn not_found(&self) -> Error {
        Error::NotFound {
            locator: self.locator().to_string(),
            handler: self.name().to_string(),
        }
    }

    fn format_error(&self, err: FormatError) -> Error {
        let locator = self.locator().to_string();
        let handler = self.name().to_string();
        match err {
            FormatError::Decode(message) => Error::Decode {
                locator,
                handler,
                message,
            },
            FormatError::Encode(message) => Error::Encode {
                locator,
                handler,
                message,
            },
            FormatError::UnknownTag(tag) => Error::UnknownTag { locator, tag },
            FormatError::Unsupported(operation) => Error::UnsupportedOperation {
                locator,
                handler,
                operation,
            },
            FormatError::Options(message) => Error::InvalidOptions {
                locator,
                handler,
                message,
            },
            FormatError::Io(source) => Error::Io { locator, source },
        }
    }

    /// Log start and outcome around one operation
    fn logged<T>(&self, operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        diagnostics::info!(
            "{operation} {locator} with {handler}",
            operation: operation,
            locator: self.locator(),
            handler: self.name()
        );
        let result = f();
        match &result {
            Ok(_) => diagnostics::info!(
                "{operation} {locator} finished",
                operation: operation,
                locator: self.locator()
            ),
            Err(err) => diagnostics::warn!(
                "{operation} {locator} failed: {error}",
                operation: operation,
                locator: self.locator(),
                error: err.to_string()
            ),
        }
        result
    }

    /// Whether the resource exists. Absence is not an error.
    pub fn exists(&self) -> Result<bool> {
        self.resource.exists()
    }

    /// Decode the resource. Caller options are laid over the format's read
    /// defaults; `reload: true` re-initializes a `python:` module first.
    pub fn read(&self, options: &Options) -> Result<Content> {
        self.logged("read", || match self.resource.target() {
            Target::Object { path, loader } => loader
                .locate(path, options.flag("reload"))
                .map(Content::Object)
                .map_err(|err| {
                    diagnostics::debug!("{locator}: {error}", locator: self.locator(), error: err.to_string());
                    self.not_found()
                }),
            target => {
                let format = self.format()?;
                if matches!(target, Target::Local(_)) && !self.resource.exists()? {
                    return Err(self.not_found());
                }
                let merged = Options::overlay(&format.read_defaults(), options);

                let mut reader = self.resource.open_read().map_err(|err| match err {
                    Error::Transport { source, .. }
                        if source.status() == Some(reqwest::StatusCode::NOT_FOUND) =>
                    {
                        self.not_found()
                    }
                    other => other,
                })?;
                let source = Source::new(reader.as_mut()).with_path(self.resource.local_path());
                format
                    .decode(source, &merged)
                    .map_err(|err| self.format_error(err))
            }
        })
    }

    /// Encode `content` to the resource.
    ///
    /// An existing resource is an [`Error::OverwriteConflict`] unless
    /// `overwrite` is set, in which case it is removed before the new
    /// content is written. Content is fully encoded before the resource
    /// is touched, so an encoding failure leaves the old resource intact.
    pub fn write(&self, content: &Content, overwrite: bool, options: &Options) -> Result<()> {
        self.logged("write", || {
            if self.entry.is_read_only() {
                return Err(Error::unsupported(self.locator(), self.name(), "write"));
            }
            let format = self.format()?;

            let exists = self.resource.exists()?;
            if exists && !overwrite {
                return Err(Error::OverwriteConflict {
                    locator: self.locator().to_string(),
                    handler: self.name().to_string(),
                });
            }

            let merged = Options::overlay(&format.write_defaults(), options);
            let mut encoded: Vec<u8> = Vec::new();
            format
                .encode(content, &mut encoded, &merged)
                .map_err(|err| self.format_error(err))?;
            if format.mode() == Mode::Text && std::str::from_utf8(&encoded).is_err() {
                return Err(self.format_error(FormatError::Encode(
                    "text format produced invalid UTF-8".to_string(),
                )));
            }

            if exists {
                diagnostics::debug!("removing {locator} before overwrite", locator: self.locator());
                self.resource.remove()?;
            }
            let mut sink = self.resource.open_write()?;
            sink.write_all(&encoded)
                .and_then(|()| sink.flush())
                .map_err(|e| Error::io(self.locator(), e))
        })
    }

    /// Delete the resource
    pub fn remove(&self) -> Result<()> {
        self.logged("remove", || {
            if self.entry.is_read_only() {
                return Err(Error::unsupported(self.locator(), self.name(), "remove"));
            }
            self.resource.remove()
        })
    }
}
